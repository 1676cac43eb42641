// Error codes shared by every CareDesk crate.
// Codes are part of the public contract: never renumber, only append.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const INCOMPLETE_MEDICATION: &str = "VALIDATION_1004";
}

pub mod remote {
    pub const TRANSPORT_FAILED: &str = "REMOTE_4001";
    pub const UNEXPECTED_RESPONSE: &str = "REMOTE_4002";
    pub const NOT_FOUND: &str = "REMOTE_4004";
}

pub mod workflow {
    pub const INVALID_TRANSITION: &str = "WORKFLOW_5001";
    pub const SESSION_IN_PROGRESS: &str = "WORKFLOW_5002";
    pub const PARTIAL_FAILURE: &str = "WORKFLOW_5003";
    pub const SESSION_CLOSED: &str = "WORKFLOW_5004";
}

pub mod configuration {
    pub const INVALID_CONFIGURATION: &str = "CONFIG_6001";
}
