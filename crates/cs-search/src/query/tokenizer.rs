//! Quote-aware splitting of query text.

/// One whitespace-separated unit of the search part of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text with quote characters removed.
    pub text: String,
    /// The token began with a quote, i.e. it is a phrase rather than a
    /// `field=value` or bare keyword.
    pub quoted: bool,
}

/// Split `query` at the first `|` outside quotes into the search part and the
/// trimmed stats part. An empty stats part counts as absent.
pub fn split_pipeline(query: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (i, c) in query.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '|' => {
                let stats = query[i + 1..].trim();
                return (query[..i].trim(), (!stats.is_empty()).then_some(stats));
            }
            None => {}
        }
    }
    (query.trim(), None)
}

/// Split on whitespace, keeping single- or double-quoted runs together.
///
/// Quotes may open mid-token (`user="jane doe"`); an unterminated quote runs
/// to the end of the input.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;
    let mut quoted = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                if !in_token {
                    quoted = true;
                }
                in_token = true;
                quote = Some(c);
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted,
                    });
                    in_token = false;
                    quoted = false;
                }
            }
            None => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(Token {
            text: current,
            quoted,
        });
    }
    tokens
}
