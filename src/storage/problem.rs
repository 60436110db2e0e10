use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub code: String,
    pub date: String, // ISO-8601, UTC
}

/// The user-editable part of a problem, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemFields {
    pub title: String,
    pub topic: String,
    pub difficulty: String,
    pub code: String,
}

impl Problem {
    /// Create a new problem with an ID generated from the title and current timestamp
    pub fn new(fields: ProblemFields) -> Self {
        let now = chrono::Utc::now();
        let id = Self::generate_id(&fields.title, now.timestamp_nanos_opt().unwrap_or(0));

        Problem {
            id,
            title: fields.title,
            topic: fields.topic,
            difficulty: fields.difficulty,
            code: fields.code,
            date: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    /// Hex MD5 digest of title and nanosecond timestamp
    pub fn generate_id(title: &str, nanos: i64) -> String {
        format!("{:x}", md5::compute(format!("{}{}", title, nanos)))
    }

    /// Overwrite every user field. `id` and `date` never change after creation.
    pub fn apply(&mut self, fields: ProblemFields) {
        self.title = fields.title;
        self.topic = fields.topic;
        self.difficulty = fields.difficulty;
        self.code = fields.code;
    }
}
