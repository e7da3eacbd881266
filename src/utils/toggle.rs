/// Boolean flag with flip and set operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggle {
    value: bool,
}

impl Toggle {
    pub fn new(initial: bool) -> Self {
        Self { value: initial }
    }

    pub fn get(&self) -> bool {
        self.value
    }

    /// Flip the flag and return the new value
    pub fn toggle(&mut self) -> bool {
        self.value = !self.value;
        self.value
    }

    pub fn set(&mut self, value: bool) {
        self.value = value;
    }
}
