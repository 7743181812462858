//! Keymap loading and key-sequence resolution.
//!
//! A keymap file is JSON with a `keymaps` object mapping a *namespace* to a
//! list of bindings:
//!
//! ```json
//! {
//!   "keymaps": {
//!     "editor": [
//!       { "action": "move_left",  "keys": [["rune:h"], ["left"]], "groups": ["n", "v"] },
//!       { "action": "move_first_line", "keys": ["rune:g", "rune:g"], "groups": ["n", "v"] }
//!     ]
//!   }
//! }
//! ```
//!
//! - `keys` is either a single key sequence or a list of alternate sequences.
//! - A key name of the form `rune:x` denotes the literal rune `x`; every
//!   other name is a lowercased terminal event name (`"esc"`, `"enter"`,
//!   `"tab"`, `"backspace"`, `"ctrl+r"`, `"left"`, ...).
//! - `groups` are the mode groups the binding applies to: `n`, `i`, `r`, `v`
//!   plus the one-line variants `on`, `oi`, `or`, `ov`.
//! - The resolved action name is `"<namespace>.<action>"`.
//!
//! Bindings are compiled into one prefix trie per group. Lookup walks the
//! trie with the pending key names and returns the actions at that node
//! (several bindings may share a sequence — they are kept in file order)
//! together with a flag saying whether longer sequences exist below it, so
//! the dispatcher knows to keep waiting for more keys.
//!
//! A malformed keymap file is a construction-time error: the editor refuses
//! to initialize rather than run with partial bindings.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to construct a [`Keymap`]. Always fatal — there is no partial or
/// fallback keymap.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// The keymap file is not valid JSON or does not match the schema.
    #[error("invalid keymap json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A binding has an empty key sequence.
    #[error("binding for {action:?} in group {group:?} has an empty key sequence")]
    EmptyKeys { action: String, group: String },
}

// ---------------------------------------------------------------------------
// JSON schema
// ---------------------------------------------------------------------------

/// `keys` accepts both a single sequence and a list of alternates.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeySpec {
    One(Vec<String>),
    Many(Vec<Vec<String>>),
}

impl KeySpec {
    fn into_sequences(self) -> Vec<Vec<String>> {
        match self {
            Self::One(seq) => vec![seq],
            Self::Many(seqs) => seqs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Binding {
    action: String,
    keys: KeySpec,
    groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeymapFile {
    keymaps: HashMap<String, Vec<Binding>>,
}

// ---------------------------------------------------------------------------
// Trie
// ---------------------------------------------------------------------------

/// One node of the key-sequence trie.
///
/// `actions` holds every action bound to the exact sequence ending here, in
/// file order — the dispatcher tries them in order (e.g. `i` in normal mode
/// is `insert` when pressed alone and `inside` in operator-pending position).
#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    actions: Vec<String>,
}

impl Node {
    fn add(&mut self, keys: &[String], action: &str) {
        match keys.split_first() {
            None => self.actions.push(action.to_string()),
            Some((head, rest)) => self.children.entry(head.clone()).or_default().add(rest, action),
        }
    }

    fn get(&self, keys: &[String]) -> (&[String], bool) {
        match keys.split_first() {
            None => (&self.actions, !self.children.is_empty()),
            Some((head, rest)) => match self.children.get(head) {
                Some(child) => child.get(rest),
                None => (&[], false),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

/// Compiled keymap: one key-sequence trie per mode group.
#[derive(Debug, Default)]
pub struct Keymap {
    groups: HashMap<String, Node>,
}

/// The bindings shipped with squill, embedded so hosts that do not supply
/// their own keymap file still get a working editor.
const DEFAULT_BINDINGS: &str = include_str!("default_keymap.json");

impl Keymap {
    /// Compile a keymap from its JSON source.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError`] if the JSON is malformed or a binding carries
    /// an empty key sequence. Construction errors are fatal by design.
    pub fn from_json(source: &str) -> Result<Self, KeymapError> {
        let file: KeymapFile = serde_json::from_str(source)?;

        let mut groups: HashMap<String, Node> = HashMap::new();
        for (namespace, bindings) in file.keymaps {
            for binding in bindings {
                let action = format!("{namespace}.{}", binding.action);
                let sequences: Vec<Vec<String>> = binding
                    .keys
                    .into_sequences()
                    .into_iter()
                    .map(|seq| seq.iter().map(|k| normalize_key(k)).collect())
                    .collect();
                for group in &binding.groups {
                    for seq in &sequences {
                        if seq.is_empty() {
                            return Err(KeymapError::EmptyKeys {
                                action: action.clone(),
                                group: group.clone(),
                            });
                        }
                        groups.entry(group.clone()).or_default().add(seq, &action);
                    }
                }
            }
        }

        Ok(Self { groups })
    }

    /// Compile the embedded default bindings.
    ///
    /// # Panics
    ///
    /// Never — the embedded file is validated by this crate's tests.
    #[must_use]
    pub fn with_default_bindings() -> Self {
        Self::from_json(DEFAULT_BINDINGS).expect("embedded default keymap is valid")
    }

    /// Resolve a pending key sequence within a group.
    ///
    /// Returns the actions bound to exactly this sequence (empty when none)
    /// and whether any longer bound sequence starts with it.
    #[must_use]
    pub fn get(&self, keys: &[String], group: &str) -> (Vec<String>, bool) {
        match self.groups.get(group) {
            Some(root) => {
                let (actions, deeper) = root.get(keys);
                (actions.to_vec(), deeper)
            }
            None => (Vec::new(), false),
        }
    }
}

/// Translate a key name from the file into the runtime event name: `rune:x`
/// becomes the literal rune, anything else is lowercased.
fn normalize_key(key: &str) -> String {
    key.strip_prefix("rune:")
        .map_or_else(|| key.to_ascii_lowercase(), ToString::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    // -- Parsing ------------------------------------------------------------

    #[test]
    fn single_sequence_binding() {
        let km = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"undo","keys":["rune:u"],"groups":["n"]}
            ]}}"#,
        )
        .unwrap();
        let (actions, deeper) = km.get(&keys(&["u"]), "n");
        assert_eq!(actions, vec!["editor.undo"]);
        assert!(!deeper);
    }

    #[test]
    fn alternate_sequences() {
        let km = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"move_left","keys":[["rune:h"],["left"]],"groups":["n"]}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(km.get(&keys(&["h"]), "n").0, vec!["editor.move_left"]);
        assert_eq!(km.get(&keys(&["left"]), "n").0, vec!["editor.move_left"]);
    }

    #[test]
    fn invalid_json_is_fatal() {
        assert!(matches!(
            Keymap::from_json("{ not json"),
            Err(KeymapError::Parse(_))
        ));
    }

    #[test]
    fn schema_mismatch_is_fatal() {
        assert!(Keymap::from_json(r#"{"keymaps": 3}"#).is_err());
    }

    #[test]
    fn empty_key_sequence_is_fatal() {
        let res = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"undo","keys":[[]],"groups":["n"]}
            ]}}"#,
        );
        assert!(matches!(res, Err(KeymapError::EmptyKeys { .. })));
    }

    // -- Key name normalization ---------------------------------------------

    #[test]
    fn rune_prefix_becomes_literal() {
        assert_eq!(normalize_key("rune:a"), "a");
        assert_eq!(normalize_key("rune:G"), "G");
        assert_eq!(normalize_key("rune:$"), "$");
    }

    #[test]
    fn named_keys_lowercased() {
        assert_eq!(normalize_key("Esc"), "esc");
        assert_eq!(normalize_key("Ctrl+R"), "ctrl+r");
        assert_eq!(normalize_key("enter"), "enter");
    }

    #[test]
    fn rune_case_is_preserved() {
        // `G` and `g` are different bindings; lowercasing must not touch runes.
        let km = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"move_last_line","keys":["rune:G"],"groups":["n"]},
                {"action":"move_first_line","keys":["rune:g","rune:g"],"groups":["n"]}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(km.get(&keys(&["G"]), "n").0, vec!["editor.move_last_line"]);
        assert_eq!(
            km.get(&keys(&["g", "g"]), "n").0,
            vec!["editor.move_first_line"]
        );
    }

    // -- Trie lookup --------------------------------------------------------

    #[test]
    fn prefix_reports_deeper_sequences() {
        let km = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"delete","keys":["rune:d"],"groups":["n"]},
                {"action":"delete_line","keys":["rune:d","rune:d"],"groups":["n"]}
            ]}}"#,
        )
        .unwrap();
        let (actions, deeper) = km.get(&keys(&["d"]), "n");
        assert_eq!(actions, vec!["editor.delete"]);
        assert!(deeper);

        let (actions, deeper) = km.get(&keys(&["d", "d"]), "n");
        assert_eq!(actions, vec!["editor.delete_line"]);
        assert!(!deeper);
    }

    #[test]
    fn unbound_sequence_is_empty() {
        let km = Keymap::with_default_bindings();
        let (actions, deeper) = km.get(&keys(&["ctrl+q"]), "n");
        assert!(actions.is_empty());
        assert!(!deeper);
    }

    #[test]
    fn unknown_group_is_empty() {
        let km = Keymap::with_default_bindings();
        let (actions, deeper) = km.get(&keys(&["h"]), "zz");
        assert!(actions.is_empty());
        assert!(!deeper);
    }

    #[test]
    fn multiple_actions_on_one_sequence_keep_order() {
        let km = Keymap::from_json(
            r#"{"keymaps":{"editor":[
                {"action":"insert","keys":["rune:i"],"groups":["n"]},
                {"action":"inside","keys":["rune:i"],"groups":["n"]}
            ]}}"#,
        )
        .unwrap();
        let (actions, _) = km.get(&keys(&["i"]), "n");
        assert_eq!(actions, vec!["editor.insert", "editor.inside"]);
    }

    // -- Default bindings ---------------------------------------------------

    #[test]
    fn default_bindings_compile() {
        let km = Keymap::with_default_bindings();
        assert_eq!(km.get(&keys(&["h"]), "n").0, vec!["editor.move_left"]);
        assert_eq!(km.get(&keys(&["d"]), "n").0, vec!["editor.delete"]);
        assert_eq!(km.get(&keys(&["enter"]), "on").0, vec!["editor.done"]);
    }

    #[test]
    fn default_bindings_cover_visual_group() {
        let km = Keymap::with_default_bindings();
        assert_eq!(km.get(&keys(&["i"]), "v").0, vec!["editor.inside"]);
        assert_eq!(km.get(&keys(&["y"]), "v").0, vec!["editor.yank"]);
        assert_eq!(
            km.get(&keys(&["o"]), "v").0,
            vec!["editor.switch_visual_start"]
        );
    }

    #[test]
    fn default_normal_i_is_insert_then_inside() {
        let km = Keymap::with_default_bindings();
        let (actions, _) = km.get(&keys(&["i"]), "n");
        assert_eq!(actions, vec!["editor.insert", "editor.inside"]);
    }
}
