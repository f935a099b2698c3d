//! Lexical scanning of method body text
//!
//! Just enough of a lexer for C-family bodies: comments and whitespace are
//! dropped, string and char literals are kept whole, and the handful of
//! two-character operators that matter for decision counting are joined.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Literal,
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

const TWO_CHAR_OPS: &[&str] = &[
    "&&", "||", "==", "!=", "<=", ">=", "->", "::", "++", "--", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "<<",
];

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "new", "null", "private", "protected", "public", "return", "short", "static", "super",
    "switch", "synchronized", "this", "throw", "throws", "true", "try", "var", "void", "while",
    "yield",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }

        let start = i;

        if b == b'"' || b == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token {
                kind: TokenKind::Literal,
                text: &src[start..i],
            });
            continue;
        }

        if b.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text: &src[start..i],
            });
            continue;
        }

        if is_word_byte(b) {
            while i < bytes.len() && is_word_byte(bytes[i]) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Word,
                text: &src[start..i],
            });
            continue;
        }

        // Symbols; non-ASCII chars are consumed whole so slices stay on char boundaries
        let width = src[i..].chars().next().map_or(1, char::len_utf8);
        let two = src.get(i..i + 2);
        let len = match two {
            Some(op) if width == 1 && TWO_CHAR_OPS.contains(&op) => 2,
            _ => width,
        };
        i += len;
        tokens.push(Token {
            kind: TokenKind::Symbol,
            text: &src[start..i],
        });
    }

    tokens
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Decision points: branches, loops, labelled case arms, catch clauses,
/// short-circuit operators and ternaries
pub fn decision_points(tokens: &[Token<'_>]) -> u32 {
    let mut count = 0;
    for (pos, token) in tokens.iter().enumerate() {
        let hit = match (token.kind, token.text) {
            (TokenKind::Word, "if" | "for" | "while" | "case" | "catch") => true,
            (TokenKind::Symbol, "&&" | "||") => true,
            // `<?` and `, ?` are generic wildcards
            (TokenKind::Symbol, "?") => !matches!(
                pos.checked_sub(1).map(|p| tokens[p].text),
                Some("<") | Some(",") | None
            ),
            _ => false,
        };
        if hit {
            count += 1;
        }
    }
    count
}

/// Canonical token sequence used for duplicate comparison
pub fn canonical(tokens: &[Token<'_>], normalize_identifiers: bool) -> Vec<String> {
    tokens
        .iter()
        .map(|t| match t.kind {
            TokenKind::Word if normalize_identifiers && !is_keyword(t.text) => "$id".to_string(),
            TokenKind::Number | TokenKind::Literal if normalize_identifiers => "$lit".to_string(),
            _ => t.text.to_string(),
        })
        .collect()
}
