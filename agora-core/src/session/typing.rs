//! Agents currently producing output.

/// Insertion-ordered set of agent names with an active typing indicator.
///
/// Membership only changes through explicit `typing` events; nothing clears
/// the set wholesale, not even a disconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingSet {
    agents: Vec<String>,
}

impl TypingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a status update. Returns true if membership changed.
    pub fn set(&mut self, agent: &str, typing: bool) -> bool {
        let position = self.agents.iter().position(|a| a == agent);
        match (typing, position) {
            (true, None) => {
                self.agents.push(agent.to_string());
                true
            }
            (false, Some(index)) => {
                self.agents.remove(index);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a == agent)
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.agents.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut typing = TypingSet::new();
        assert!(typing.set("A", true));
        assert!(!typing.set("A", true));
        assert_eq!(typing.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut typing = TypingSet::new();
        assert!(!typing.set("A", false));
        assert!(typing.is_empty());
    }

    #[test]
    fn test_last_status_wins() {
        let sequences: &[&[bool]] = &[
            &[true],
            &[false],
            &[true, false],
            &[false, true],
            &[true, true, false],
            &[false, false, true],
            &[true, false, true, true],
            &[true, false, false],
        ];

        for sequence in sequences {
            let mut typing = TypingSet::new();
            typing.set("other", true);
            for status in sequence.iter() {
                typing.set("A", *status);
            }
            let last = *sequence.last().unwrap();
            assert_eq!(typing.contains("A"), last, "sequence {:?}", sequence);
            assert!(typing.contains("other"));
        }
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut typing = TypingSet::new();
        typing.set("Qwen", true);
        typing.set("DeepSeek", true);
        typing.set("Doubao", true);
        typing.set("DeepSeek", false);

        let agents: Vec<&str> = typing.iter().collect();
        assert_eq!(agents, vec!["Qwen", "Doubao"]);
    }
}
