use serde::{Deserialize, Serialize};

use crate::persona::Character;

#[derive(Debug, Serialize, Deserialize)]
pub struct TalkRequest {
    pub character: Character,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TalkResponse {
    pub reply: String,
}

// Body of GET /test. Key names and the status-string vocabulary are part
// of the diagnostic contract.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}
