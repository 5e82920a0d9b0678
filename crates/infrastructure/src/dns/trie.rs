//! Domain-keyed trie walked from the last byte of the name backwards, so
//! names sharing a suffix share nodes.

use dnsrelay_domain::DomainError;

const ALPHABET: usize = 38;
const SEPARATOR: usize = 37;
const ROOT: u32 = 0;
/// Child slot value meaning "no child"; the root is never a child.
const NONE: u32 = 0;

/// Child slot for a name byte: `0-9`, case-folded `a-z`, `-`, and `.`
/// (control bytes count as `.`). Other bytes are unroutable.
#[inline]
fn slot(byte: u8) -> Option<usize> {
    match byte {
        b'0'..=b'9' => Some(usize::from(byte - b'0')),
        b'a'..=b'z' => Some(10 + usize::from(byte - b'a')),
        b'A'..=b'Z' => Some(10 + usize::from(byte - b'A')),
        b'-' => Some(36),
        b'.' | 0x00..=0x1F | 0x7F => Some(SEPARATOR),
        _ => None,
    }
}

struct Node<V> {
    children: [u32; ALPHABET],
    /// Values stored at or below this node.
    size: usize,
    value: Option<V>,
}

impl<V> Node<V> {
    fn empty() -> Self {
        Self {
            children: [NONE; ALPHABET],
            size: 0,
            value: None,
        }
    }
}

pub struct DomainTrie<V> {
    nodes: Vec<Node<V>>,
    free: Vec<u32>,
}

impl<V> Default for DomainTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DomainTrie<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::empty()],
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes[ROOT as usize].size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn alloc(&mut self) -> u32 {
        match self.free.pop() {
            Some(index) => index,
            None => {
                self.nodes.push(Node::empty());
                (self.nodes.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, index: u32) {
        self.nodes[index as usize] = Node::empty();
        self.free.push(index);
    }

    fn slots(key: &str) -> Result<Vec<usize>, DomainError> {
        if key.is_empty() {
            return Err(DomainError::InvalidDomainName("empty domain name".to_string()));
        }
        key.bytes()
            .rev()
            .map(|b| {
                slot(b).ok_or_else(|| {
                    DomainError::InvalidDomainName(format!(
                        "unsupported byte {:#04x} in {:?}",
                        b, key
                    ))
                })
            })
            .collect()
    }

    fn locate(&self, key: &str) -> Option<u32> {
        if key.is_empty() {
            return None;
        }
        let mut node = ROOT;
        for b in key.bytes().rev() {
            let child = self.nodes[node as usize].children[slot(b)?];
            if child == NONE {
                return None;
            }
            node = child;
        }
        Some(node)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: V) -> Result<Option<V>, DomainError> {
        let slots = Self::slots(key)?;

        let mut path = Vec::with_capacity(slots.len() + 1);
        let mut node = ROOT;
        path.push(node);
        for s in slots {
            let mut child = self.nodes[node as usize].children[s];
            if child == NONE {
                child = self.alloc();
                self.nodes[node as usize].children[s] = child;
            }
            node = child;
            path.push(node);
        }

        let previous = self.nodes[node as usize].value.replace(value);
        if previous.is_none() {
            for index in path {
                self.nodes[index as usize].size += 1;
            }
        }
        Ok(previous)
    }

    /// Removes `key`, pruning every node left without values.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        if key.is_empty() {
            return None;
        }

        let mut path = Vec::with_capacity(key.len() + 1);
        let mut node = ROOT;
        path.push((node, 0usize));
        for b in key.bytes().rev() {
            let s = slot(b)?;
            let child = self.nodes[node as usize].children[s];
            if child == NONE {
                return None;
            }
            node = child;
            path.push((node, s));
        }

        let value = self.nodes[node as usize].value.take()?;

        for i in (0..path.len()).rev() {
            let (index, s) = path[i];
            let entry = &mut self.nodes[index as usize];
            entry.size -= 1;
            if entry.size == 0 && index != ROOT {
                let parent = path[i - 1].0;
                self.nodes[parent as usize].children[s] = NONE;
                self.release(index);
            }
        }
        Some(value)
    }

    pub fn find(&self, key: &str) -> Option<&V> {
        let node = self.locate(key)?;
        self.nodes[node as usize].value.as_ref()
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut V> {
        let node = self.locate(key)?;
        self.nodes[node as usize].value.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_find_remove() {
        let mut trie = DomainTrie::new();
        assert_eq!(trie.insert("example.com", 1).unwrap(), None);
        assert_eq!(trie.find("example.com"), Some(&1));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.remove("example.com"), Some(1));
        assert_eq!(trie.find("example.com"), None);
        assert!(trie.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut trie = DomainTrie::new();
        trie.insert("Example.COM", "v").unwrap();
        assert_eq!(trie.find("example.com"), Some(&"v"));
        assert_eq!(trie.find("EXAMPLE.com"), Some(&"v"));
    }

    #[test]
    fn test_control_bytes_match_separator() {
        let mut trie = DomainTrie::new();
        trie.insert("www.example.com", 7).unwrap();
        assert_eq!(trie.find("www\x07example\x03com"), Some(&7));
    }

    #[test]
    fn test_replace_keeps_size() {
        let mut trie = DomainTrie::new();
        trie.insert("a.com", 1).unwrap();
        let nodes = trie.node_count();
        assert_eq!(trie.insert("a.com", 2).unwrap(), Some(1));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.node_count(), nodes);
        assert_eq!(trie.find("a.com"), Some(&2));
    }

    #[test]
    fn test_shared_suffix_shares_nodes() {
        let mut trie = DomainTrie::new();
        trie.insert("a.example.com", ()).unwrap();
        let after_first = trie.node_count();
        trie.insert("b.example.com", ()).unwrap();
        // Only the leading "b" is new.
        assert_eq!(trie.node_count(), after_first + 1);
    }

    #[test]
    fn test_suffix_key_is_distinct_entry() {
        let mut trie = DomainTrie::new();
        trie.insert("www.example.com", 1).unwrap();
        trie.insert("example.com", 2).unwrap();
        assert_eq!(trie.find("www.example.com"), Some(&1));
        assert_eq!(trie.find("example.com"), Some(&2));
        assert_eq!(trie.find("ample.com"), None);

        assert_eq!(trie.remove("example.com"), Some(2));
        assert_eq!(trie.find("www.example.com"), Some(&1));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_remove_prunes_to_root() {
        let mut trie = DomainTrie::new();
        trie.insert("one.test", 1).unwrap();
        trie.insert("two.test", 2).unwrap();
        trie.remove("one.test");
        trie.remove("two.test");
        assert_eq!(trie.node_count(), 1);
    }

    #[test]
    fn test_freed_nodes_are_reused() {
        let mut trie = DomainTrie::new();
        trie.insert("abc", 1).unwrap();
        trie.remove("abc");
        let allocated = trie.nodes.len();
        trie.insert("xyz", 2).unwrap();
        assert_eq!(trie.nodes.len(), allocated);
    }

    #[test]
    fn test_unroutable_bytes_rejected() {
        let mut trie = DomainTrie::new();
        assert!(matches!(
            trie.insert("bad_name.com", 1),
            Err(DomainError::InvalidDomainName(_))
        ));
        assert!(trie.insert("", 1).is_err());
        assert_eq!(trie.node_count(), 1);

        trie.insert("0.com", 5).unwrap();
        assert_eq!(trie.find("_.com"), None);
        assert_eq!(trie.remove("_.com"), None);
        assert_eq!(trie.find("0.com"), Some(&5));
    }

    #[test]
    fn test_remove_missing_key_leaves_counts() {
        let mut trie = DomainTrie::new();
        trie.insert("www.example.com", 1).unwrap();
        assert_eq!(trie.remove("example.com"), None);
        assert_eq!(trie.remove("mail.example.com"), None);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.find("www.example.com"), Some(&1));
    }

    #[test]
    fn test_find_mut() {
        let mut trie = DomainTrie::new();
        trie.insert("example.com", vec![1]).unwrap();
        trie.find_mut("example.com").unwrap().push(2);
        assert_eq!(trie.find("example.com"), Some(&vec![1, 2]));
        assert!(trie.find_mut("other.com").is_none());
    }
}
