use std::collections::BTreeMap;

/// Short codec names mapped to the class the engine expects.
///
/// Lookups ignore case. Names without an alias are taken as fully qualified
/// codec classes and passed through as given.
#[derive(Debug, Clone, Default)]
pub struct CodecTable {
    aliases: BTreeMap<String, String>,
}

impl CodecTable {
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(name, class)| (name.as_ref().to_lowercase(), class.into()))
                .collect(),
        }
    }

    /// Aliases for the Hadoop compression codecs
    pub fn hadoop() -> Self {
        Self::new(default_aliases())
    }

    pub fn resolve<'a>(&'a self, codec: &'a str) -> &'a str {
        let codec = codec.trim();
        self.aliases
            .get(&codec.to_lowercase())
            .map(String::as_str)
            .unwrap_or(codec)
    }

    pub fn is_alias(&self, codec: &str) -> bool {
        self.aliases.contains_key(&codec.trim().to_lowercase())
    }
}

pub fn default_aliases() -> BTreeMap<String, String> {
    [
        ("gzip", "org.apache.hadoop.io.compress.GzipCodec"),
        ("bzip", "org.apache.hadoop.io.compress.BZip2Codec"),
        ("lzo", "com.hadoop.compression.lzo.LzopCodec"),
        ("snappy", "org.apache.hadoop.io.compress.SnappyCodec"),
    ]
    .into_iter()
    .map(|(name, class)| (name.to_string(), class.to_string()))
    .collect()
}
