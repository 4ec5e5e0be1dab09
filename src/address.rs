//! Gorn addresses: digit-string paths from the tree root.
//!
//! The root is the empty string; every further character picks a daughter
//! branch, 1-indexed. Prefixes encode dominance, so all structural relations
//! reduce to string arithmetic on addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MgError;

/// A node's path from the root, e.g. `"231"` = third daughter of the second
/// daughter of the root's first daughter... read left to right.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The root address (empty path).
    pub fn root() -> Self {
        Address(String::new())
    }

    /// Validate and wrap a digit string. Branches are 1-indexed, so only
    /// the characters `1`-`9` are admissible.
    pub fn new(path: impl Into<String>) -> Result<Self, MgError> {
        let path = path.into();
        if path.chars().all(|c| ('1'..='9').contains(&c)) {
            Ok(Address(path))
        } else {
            Err(MgError::InvalidAddress(path))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Tree depth of the node (root = 0).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Address of the immediately dominating node, `None` for the root.
    pub fn mother(&self) -> Option<Address> {
        if self.0.is_empty() {
            None
        } else {
            Some(Address(self.0[..self.0.len() - 1].to_string()))
        }
    }

    /// Bottom-up list of all properly dominating addresses, mother first,
    /// root last.
    ///
    /// ```
    /// use mgload::address::Address;
    /// let a = Address::new("1314").unwrap();
    /// let up: Vec<String> = a.ancestors().iter().map(|x| x.to_string()).collect();
    /// assert_eq!(up, ["131", "13", "1", ""]);
    /// ```
    pub fn ancestors(&self) -> Vec<Address> {
        (1..=self.0.len())
            .map(|i| Address(self.0[..self.0.len() - i].to_string()))
            .collect()
    }

    /// Address of the k-th daughter.
    pub fn daughter(&self, branch: u8) -> Result<Address, MgError> {
        if (1..=9).contains(&branch) {
            Ok(Address(format!("{}{}", self.0, branch)))
        } else {
            Err(MgError::InvalidAddress(format!("{}{}", self.0, branch)))
        }
    }

    /// Address of the immediately following sibling.
    pub fn next_sibling(&self) -> Result<Address, MgError> {
        match self.last_branch() {
            Some(branch) => self
                .mother()
                .expect("non-root address has a mother")
                .daughter(branch + 1),
            None => Err(MgError::InvalidAddress(self.0.clone())),
        }
    }

    /// Which daughter of its mother this node is, `None` for the root.
    pub fn last_branch(&self) -> Option<u8> {
        self.0
            .chars()
            .last()
            .map(|c| c.to_digit(10).expect("validated digit") as u8)
    }

    /// Reflexive dominance: does `self` lie on the path from the root
    /// to `other`?
    pub fn dominates(&self, other: &Address) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Proper dominance: dominance excluding identity.
    pub fn properly_dominates(&self, other: &Address) -> bool {
        self != other && self.dominates(other)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = MgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = MgError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::new(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> String {
        a.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_non_digit_paths() {
        assert!(Address::new("102").is_err());
        assert!(Address::new("1a").is_err());
        assert!(Address::new("231").is_ok());
        assert!(Address::new("").is_ok());
    }

    #[test]
    fn mother_and_ancestors() {
        let a = Address::new("231").unwrap();
        assert_eq!(a.mother().unwrap().as_str(), "23");
        assert_eq!(
            a.ancestors(),
            vec![
                Address::new("23").unwrap(),
                Address::new("2").unwrap(),
                Address::root()
            ]
        );
        assert!(Address::root().mother().is_none());
        assert!(Address::root().ancestors().is_empty());
    }

    #[test]
    fn dominance_is_prefixhood() {
        let top = Address::new("2").unwrap();
        let deep = Address::new("231").unwrap();
        assert!(top.dominates(&deep));
        assert!(top.properly_dominates(&deep));
        assert!(top.dominates(&top));
        assert!(!top.properly_dominates(&top));
        // "21" is not a prefix of "231"
        assert!(!Address::new("21").unwrap().dominates(&deep));
    }

    #[test]
    fn sibling_stepping() {
        let a = Address::new("22").unwrap();
        assert_eq!(a.next_sibling().unwrap().as_str(), "23");
        assert!(Address::root().next_sibling().is_err());
        assert!(Address::new("29").unwrap().next_sibling().is_err());
    }
}
