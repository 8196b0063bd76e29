//! Single-slot "latest value" cells for host-pushed configuration.
//!
//! Writes are last-write-wins and bump a version only when the value actually
//! changes; readers remember the version they last consumed.

#[derive(Clone, Debug, Default)]
pub struct Latest<T> {
    value: T,
    version: u64,
}

impl<T: Clone + PartialEq> Latest<T> {
    pub fn new(value: T) -> Self {
        Self { value, version: 0 }
    }

    pub fn set(&mut self, value: T) {
        if self.value != value {
            self.value = value;
            self.version += 1;
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The value if it changed since `seen`, updating `seen`.
    pub fn take_changed(&self, seen: &mut u64) -> Option<&T> {
        if *seen == self.version {
            return None;
        }
        *seen = self.version;
        Some(&self.value)
    }
}
