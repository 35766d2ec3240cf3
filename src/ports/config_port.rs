//! Configuration access port trait.

/// Typed getters return `Ok(None)` when the key is absent and `Err` with the
/// parser's message when it is present but malformed.
pub trait ConfigPort {
    /// Raw value for `key` in `section`, or `None` when absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_uint(&self, section: &str, key: &str) -> Result<Option<u64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;

    fn has_section(&self, section: &str) -> bool;
}
