//! TAB completion sub-mode (spec §4.6).

/// Candidates collected from the host's completion callback for one TAB
/// press. Populated via [`Completions::add`], mirroring the spec's
/// `add_completion` helper.
#[derive(Default)]
pub struct Completions {
    items: Vec<String>,
}

impl Completions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, s: impl Into<String>) {
        self.items.push(s.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.items.get(i).map(String::as_str)
    }
}
