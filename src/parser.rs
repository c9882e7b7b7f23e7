/// Input redirection operator.
pub const REDIRECT_IN: &str = "<";
/// Output redirection operator (create or truncate).
pub const REDIRECT_OUT: &str = ">";
/// Background marker.
pub const BACKGROUND: &str = "&";

/// A single word of input.
///
/// A quoted word never acts as an operator, even when its text is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub quoted: bool,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            quoted: true,
        }
    }

    /// Whether this is the bare, unquoted operator `op`.
    fn is_operator(&self, op: &str) -> bool {
        !self.quoted && self.text == op
    }
}

/// One line of input split into tokens.
///
/// No token carries meaning yet; the launcher assigns it positionally when
/// it classifies the command into a [`LaunchSpec`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<Token>,
}

impl Command {
    /// Builds a command from unquoted words.
    pub fn new(words: Vec<String>) -> Self {
        Command::from_tokens(words.into_iter().map(Token::word).collect())
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Command { tokens }
    }

    /// Tokenizes a raw input line.
    pub fn parse(line: &str) -> Self {
        Command::from_tokens(tokenize(line))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token, the one built-ins are matched against.
    pub fn name(&self) -> Option<&str> {
        self.arg(0)
    }

    /// Token at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|token| token.text.as_str())
    }

    /// The tokens joined back together, for log messages.
    pub fn display(&self) -> String {
        let words: Vec<_> = self.tokens.iter().map(|token| token.text.as_str()).collect();
        words.join(" ")
    }
}

/// What the launcher needs to start one process.
///
/// Only [`LaunchSpec::classify`] builds one, so `argv` is never empty.
#[derive(Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    argv: Vec<String>,
    infile: Option<String>,
    outfile: Option<String>,
    background: bool,
}

impl LaunchSpec {
    /// Classifies a command's tokens left to right.
    ///
    /// A redirection operator consumes the token after it as its operand and
    /// the last one of each kind wins. An operator with nothing after it is
    /// kept as a plain argument, and so is a quoted one. Returns `None` when
    /// no arguments remain.
    pub fn classify(cmd: &Command) -> Option<LaunchSpec> {
        let mut argv = Vec::new();
        let mut infile = None;
        let mut outfile = None;
        let mut background = false;
        let mut iter = cmd.tokens().iter().peekable();

        while let Some(token) = iter.next() {
            let has_operand = iter.peek().is_some();
            if token.is_operator(REDIRECT_IN) && has_operand {
                infile = iter.next().map(|t| t.text.clone());
            } else if token.is_operator(REDIRECT_OUT) && has_operand {
                outfile = iter.next().map(|t| t.text.clone());
            } else if token.is_operator(BACKGROUND) {
                background = true;
            } else {
                argv.push(token.text.clone());
            }
        }

        if argv.is_empty() {
            log::trace!("{:?} has no program", cmd.display());
            return None;
        }
        let spec = LaunchSpec {
            argv,
            infile,
            outfile,
            background,
        };
        log::trace!("classified {:?} as {:?}", cmd.display(), spec);
        Some(spec)
    }

    /// Program name as typed.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Program name first, then its arguments.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Input redirection file, if any.
    pub fn infile(&self) -> Option<&str> {
        self.infile.as_deref()
    }

    /// Output redirection file, if any.
    pub fn outfile(&self) -> Option<&str> {
        self.outfile.as_deref()
    }

    /// Run without waiting and without the terminal.
    pub fn is_background(&self) -> bool {
        self.background
    }
}

fn is_operator(ch: char) -> bool {
    ch == '<' || ch == '>' || ch == '&'
}

/// Splits an input line into tokens. This function handles:
///
/// - Quoted strings (using single or double quotes)
/// - Special tokens: `<`, `>` and `&`, which always stand alone unless quoted
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '"' || ch == '\'' {
            let quote = ch;
            chars.next();
            let mut token = String::new();
            for c in chars.by_ref() {
                if c == quote {
                    break;
                }
                token.push(c);
            }
            tokens.push(Token::quoted(token));
        } else if is_operator(ch) {
            tokens.push(Token::word(ch));
            chars.next();
        } else {
            let mut token = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || is_operator(c) {
                    break;
                }
                token.push(c);
                chars.next();
            }
            tokens.push(Token::word(token));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(tokens: &[&str]) -> Command {
        Command::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    fn words(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|token| token.text).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(words("ls -l"), vec!["ls", "-l"]);
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(words("echo \"hello world\" 'a b'"), vec!["echo", "hello world", "a b"]);
    }

    #[test]
    fn test_tokenize_operators_split_words() {
        assert_eq!(
            words("sort<in.txt>out.txt&"),
            vec!["sort", "<", "in.txt", ">", "out.txt", "&"]
        );
    }

    #[test]
    fn test_tokenize_trailing_operator() {
        assert_eq!(words("echo hi >"), vec!["echo", "hi", ">"]);
    }

    #[test]
    fn test_tokenize_blank_line() {
        assert!(Command::parse("   \t\n").is_empty());
    }

    #[test]
    fn test_classify_plain_arguments() {
        let spec = LaunchSpec::classify(&cmd(&["grep", "-n", "x", "f.txt"])).unwrap();
        assert_eq!(spec.argv(), vec!["grep", "-n", "x", "f.txt"]);
        assert_eq!(spec.infile(), None);
        assert_eq!(spec.outfile(), None);
        assert!(!spec.is_background());
    }

    #[test]
    fn test_classify_redirections_and_background() {
        let spec =
            LaunchSpec::classify(&cmd(&["grep", "x", "<", "in.txt", ">", "out.txt", "&"])).unwrap();
        assert_eq!(spec.argv(), vec!["grep", "x"]);
        assert_eq!(spec.infile(), Some("in.txt"));
        assert_eq!(spec.outfile(), Some("out.txt"));
        assert!(spec.is_background());
    }

    #[test]
    fn test_classify_last_redirect_wins() {
        let tokens = ["cat", "<", "a.txt", "<", "b.txt", ">", "x", ">", "y"];
        let spec = LaunchSpec::classify(&cmd(&tokens)).unwrap();
        assert_eq!(spec.argv(), vec!["cat"]);
        assert_eq!(spec.infile(), Some("b.txt"));
        assert_eq!(spec.outfile(), Some("y"));
    }

    #[test]
    fn test_classify_dangling_operator_is_an_argument() {
        let spec = LaunchSpec::classify(&cmd(&["echo", "a", ">"])).unwrap();
        assert_eq!(spec.argv(), vec!["echo", "a", ">"]);
        assert_eq!(spec.outfile(), None);

        let spec = LaunchSpec::classify(&cmd(&["echo", "<"])).unwrap();
        assert_eq!(spec.argv(), vec!["echo", "<"]);
    }

    #[test]
    fn test_classify_background_anywhere() {
        let spec = LaunchSpec::classify(&cmd(&["sleep", "&", "1"])).unwrap();
        assert_eq!(spec.argv(), vec!["sleep", "1"]);
        assert!(spec.is_background());
    }

    #[test]
    fn test_classify_without_arguments() {
        assert_eq!(LaunchSpec::classify(&cmd(&["&"])), None);
        assert_eq!(LaunchSpec::classify(&cmd(&["<", "in.txt"])), None);
        assert_eq!(LaunchSpec::classify(&cmd(&[])), None);
    }

    #[test]
    fn test_tokenize_marks_quoted_words() {
        assert_eq!(
            tokenize("echo '>' \"&\" <"),
            vec![Token::word("echo"), Token::quoted(">"), Token::quoted("&"), Token::word("<")]
        );
    }

    #[test]
    fn test_classify_quoted_operators_are_arguments() {
        let spec = LaunchSpec::classify(&Command::parse("echo '>' x \"<\" y '&'")).unwrap();
        assert_eq!(spec.argv(), vec!["echo", ">", "x", "<", "y", "&"]);
        assert_eq!(spec.infile(), None);
        assert_eq!(spec.outfile(), None);
        assert!(!spec.is_background());
    }

    #[test]
    fn test_classify_quoted_operand_is_still_consumed() {
        let spec = LaunchSpec::classify(&Command::parse("cat < 'my file.txt'")).unwrap();
        assert_eq!(spec.argv(), vec!["cat"]);
        assert_eq!(spec.infile(), Some("my file.txt"));
    }
}
