use std::io::{self, Write};

pub fn print_usage(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "lash: a little shell")?;
    writeln!(out, "Usage: lash [script]")?;
    writeln!(out)?;
    writeln!(out, "Built-in commands:")?;
    writeln!(out, "   help         Print this help message")?;
    writeln!(out, "   exit [code]  Exit the shell with an optional status")?;
    writeln!(out, "   cd [path]    Change directory (no path = $HOME)")?;
    writeln!(out, "   pwd          Print the working directory")?;
    writeln!(out, "   wait         Wait for all background jobs to finish")?;
    out.flush()
}
