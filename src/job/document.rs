use serde::Serialize;

/// One fully rendered job, bound to a single directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDocument {
    topic: String,
    directory: String,
    input_path: String,
    output_path: String,
    content: String,
}

impl JobDocument {
    pub fn new(
        topic: impl Into<String>,
        directory: impl Into<String>,
        input_path: impl Into<String>,
        output_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            directory: directory.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            content: content.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// File name stem for the persisted document, e.g. `clickstream-2016-03-09`
    pub fn file_stem(&self) -> String {
        let sanitize = |value: &str| {
            value
                .chars()
                .map(|ch| match ch {
                    '/' | '\\' | '*' | ' ' => '_',
                    other => other,
                })
                .collect::<String>()
        };
        format!("{}-{}", sanitize(&self.topic), sanitize(&self.directory))
    }
}
