use serde::Serialize;

/// Body of the liveness endpoint.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self { Self { status: "ok" } }
}

/// Body returned by mutating endpoints that have nothing else to report.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self { Self { status: "ok" } }
}
