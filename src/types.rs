use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// One search hit: the upstream object plus the fields this crate injects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub source_name: String,
    pub source_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl SearchResultItem {
    /// Wrap an upstream list entry. Non-objects are rejected; upstream copies of the
    /// injected fields are discarded.
    pub fn stamp(raw: Value, source_name: &str, source_code: &str, api_url: Option<&str>) -> Option<Self> {
        let Value::Object(mut fields) = raw else { return None };
        for k in ["source_name", "source_code", "api_url"] { fields.remove(k); }
        Some(Self {
            fields,
            source_name: source_name.to_string(),
            source_code: source_code.to_string(),
            api_url: api_url.map(str::to_string),
        })
    }

    pub fn vod_id(&self) -> String {
        match self.fields.get("vod_id") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn vod_name(&self) -> &str { self.fields.get("vod_name").and_then(Value::as_str).unwrap_or("") }

    /// `source_code + "_" + vod_id`
    pub fn dedup_key(&self) -> String { format!("{}_{}", self.source_code, self.vod_id()) }
}

/// First element of an upstream detail `list`. Only the fields the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_pic: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_play_url: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("expected string, number, or null")),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetail {
    pub title: Option<String>,
    pub cover: Option<String>,
    pub desc: Option<String>,
    /// Chosen stream URLs, in play order. Every entry starts with `http`.
    pub episodes: Vec<String>,
    pub source_name: String,
    pub source_code: String,
}

/// `videoInfo` block of a detail reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub source_name: String,
    pub source_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<SearchResultItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<String>>,
    #[serde(rename = "videoInfo", default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ResultEnvelope {
    pub fn search(list: Vec<SearchResultItem>) -> Self {
        Self { code: 200, list: Some(list), episodes: None, video_info: None, msg: None }
    }

    pub fn detail(detail: VideoDetail) -> Self {
        let VideoDetail { title, cover, desc, episodes, source_name, source_code } = detail;
        Self {
            code: 200,
            list: None,
            episodes: Some(episodes),
            video_info: Some(VideoInfo { title, cover, desc, source_name, source_code }),
            msg: None,
        }
    }

    /// `Internal` errors collapse to [`ResultEnvelope::internal`]; everything else is a 400.
    pub fn failure(err: &Error) -> Self {
        if let Error::Internal(_) = err { return Self::internal(); }
        Self { code: 400, list: Some(Vec::new()), episodes: Some(Vec::new()), video_info: None, msg: Some(err.to_string()) }
    }

    /// Outermost failure; carries no detail.
    pub fn internal() -> Self {
        Self { code: 500, list: None, episodes: None, video_info: None, msg: Some("Internal Server Error".to_string()) }
    }

    pub fn is_success(&self) -> bool { self.code == 200 }
}
