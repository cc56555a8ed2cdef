//! Symbol table management for labels
//!
//! Built once during pass 1 and never modified afterwards. Symbols keep their
//! definition order so the table can be exported as-is.

use crate::assembler::Symbol;

/// Labels defined by a program, in the order they appear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` at `address`
    ///
    /// A name can only be defined once. On a clash the first definition wins and a
    /// copy of it is returned as the error.
    pub fn add_symbol(
        &mut self,
        name: String,
        address: u16,
        defined_at: usize,
    ) -> Result<(), Symbol> {
        match self.lookup_symbol(&name) {
            Some(first) => Err(first.clone()),
            None => {
                self.symbols.push(Symbol {
                    name,
                    address,
                    defined_at,
                });
                Ok(())
            }
        }
    }

    /// Exact, case-sensitive match on the label name
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Address of a label, if defined
    pub fn address_of(&self, name: &str) -> Option<u16> {
        self.lookup_symbol(name).map(|s| s.address)
    }

    /// Definitions in source order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_then_find() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("start".to_string(), 0x8000, 1).is_ok());
        assert!(table.add_symbol("loop".to_string(), 0x8010, 5).is_ok());

        let start = table.lookup_symbol("start").unwrap();
        assert_eq!(start.name, "start");
        assert_eq!(start.address, 0x8000);

        assert_eq!(table.address_of("loop"), Some(0x8010));
        assert!(table.lookup_symbol("undefined").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_definition_wins() {
        let mut table = SymbolTable::new();

        assert!(table.add_symbol("loop".to_string(), 0x8000, 1).is_ok());
        let existing = table.add_symbol("loop".to_string(), 0x9000, 10).unwrap_err();
        assert_eq!(existing.defined_at, 1);

        assert_eq!(table.address_of("loop"), Some(0x8000));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let mut table = SymbolTable::new();
        assert!(table.add_symbol("Loop".to_string(), 0, 1).is_ok());
        assert!(table.add_symbol("loop".to_string(), 2, 2).is_ok());
        let names: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Loop", "loop"]);
    }
}
