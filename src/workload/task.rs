use std::fmt;

/// Endpoint family of an I/O task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    Posts,
    Comments,
    Todos,
}

impl EndpointCategory {
    /// Number of distinct resources in the category.
    #[must_use]
    pub const fn size(self) -> u64 {
        match self {
            EndpointCategory::Posts => 100,
            EndpointCategory::Comments => 500,
            EndpointCategory::Todos => 200,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EndpointCategory::Posts => "posts",
            EndpointCategory::Comments => "comments",
            EndpointCategory::Todos => "todos",
        }
    }

    /// Category for a 1-based request number.
    #[must_use]
    pub const fn for_request(request_number: u64) -> Self {
        match request_number % 3 {
            0 => EndpointCategory::Posts,
            1 => EndpointCategory::Comments,
            _ => EndpointCategory::Todos,
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "posts" => Some(EndpointCategory::Posts),
            "comments" => Some(EndpointCategory::Comments),
            "todos" => Some(EndpointCategory::Todos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub category: EndpointCategory,
    pub id: u64,
}

impl Endpoint {
    /// Path relative to the collaborator's base URL.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}/{}", self.category.as_str(), self.id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskInput {
    Fetch(Endpoint),
    /// Count primes below the given bound.
    Compute(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    index: usize,
    input: TaskInput,
}

impl Task {
    #[must_use]
    pub const fn new(index: usize, input: TaskInput) -> Self {
        Self { index, input }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn input(&self) -> &TaskInput {
        &self.input
    }
}
