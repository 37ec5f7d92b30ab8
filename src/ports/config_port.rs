//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value for `key` in `section`; typed parsing is the caller's concern.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Keys present in `section`, sorted. Empty when the section is missing.
    fn keys(&self, section: &str) -> Vec<String>;
}
