//! Tokens known to the scanner.

use crate::TokenKind;

/// Immutable HashMap for fast cloning of token tables.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

/// Binding power.
pub type Prec = u32;

/// Information attached to a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    token: String,
    prec: Prec,
    command: bool,
}

impl TokenInfo {
    /// Text of the token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Left binding power of the token in expressions.
    pub fn prec(&self) -> Prec {
        self.prec
    }

    /// Return true if the token starts a command.
    pub fn is_command(&self) -> bool {
        self.command
    }

    pub fn kind(&self) -> TokenKind {
        if self.command {
            TokenKind::CommandKeyword
        } else {
            TokenKind::Keyword
        }
    }
}

/// Map from token texts to their information.
///
/// Tokens may be symbolic (`+`, `→`, `.{`) or alphanumeric (`fun`, `check`).
/// Alphanumeric tokens are recognised as keywords only if
/// a complete identifier matches them, whereas
/// symbolic tokens are cut out of symbol runs by longest match.
#[derive(Clone, Debug, Default)]
pub struct TokenTable {
    tokens: FnvHashMap<String, TokenInfo>,
    max_len: usize,
}

impl TokenTable {
    /// Construct an empty token table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token with given binding power.
    ///
    /// If the token is already a command keyword, it stays one.
    ///
    /// ~~~
    /// # use analizi_scan::TokenTable;
    /// let mut table = TokenTable::new();
    /// table.insert("+", 65);
    /// table.insert("+", 70);
    /// assert_eq!(table.get("+").map(|i| i.prec()), Some(70));
    /// ~~~
    pub fn insert(&mut self, token: &str, prec: Prec) {
        let command = self.get(token).map_or(false, |i| i.command);
        self.insert_info(token, prec, command)
    }

    /// Add a token that starts a command.
    pub fn insert_command(&mut self, token: &str) {
        self.insert_info(token, 0, true)
    }

    fn insert_info(&mut self, token: &str, prec: Prec, command: bool) {
        self.max_len = self.max_len.max(token.len());
        let token = token.to_string();
        let info = TokenInfo {
            token: token.clone(),
            prec,
            command,
        };
        self.tokens.insert(token, info);
    }

    pub fn get(&self, token: &str) -> Option<&TokenInfo> {
        self.tokens.get(token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Find the longest token that is a prefix of `s`,
    /// returning its length in bytes together with its information.
    pub fn longest_prefix(&self, s: &str) -> Option<(usize, &TokenInfo)> {
        let ends: Vec<usize> = s
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take_while(|end| *end <= self.max_len)
            .collect();
        ends.into_iter()
            .rev()
            .find_map(|end| self.get(&s[..end]).map(|info| (end, info)))
    }
}

#[test]
fn longest_prefix() {
    let mut table = TokenTable::new();
    table.insert("-", 65);
    table.insert("->", 25);
    table.insert("→", 25);
    table.insert_command("check");
    assert_eq!(table.longest_prefix("->(").map(|(l, _)| l), Some(2));
    assert_eq!(table.longest_prefix("-(").map(|(l, _)| l), Some(1));
    assert_eq!(table.longest_prefix("→→").map(|(l, _)| l), Some("→".len()));
    assert_eq!(table.longest_prefix("*"), None);
    assert_eq!(table.get("check").map(|i| i.kind()), Some(TokenKind::CommandKeyword));

    // redeclaring a command keyword keeps it a command keyword
    table.insert("check", 10);
    assert!(table.get("check").map_or(false, |i| i.is_command()));
}
