use common::model::frame::{Tone, View};
use serde::{Deserialize, Serialize};

/// Query string of the image route. Detail lines travel newline-joined.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageQuery {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub details: String,
    #[serde(default = "neutral")]
    pub tone: Tone,
}

fn neutral() -> Tone {
    Tone::Neutral
}

impl From<&View> for ImageQuery {
    fn from(view: &View) -> Self {
        ImageQuery {
            headline: view.headline.clone(),
            details: view.details.join("\n"),
            tone: view.tone,
        }
    }
}

impl From<ImageQuery> for View {
    fn from(query: ImageQuery) -> Self {
        View {
            headline: query.headline,
            details: query
                .details
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            tone: query.tone,
        }
    }
}

#[derive(Serialize)]
pub struct HealthzResponse {
    pub ok: bool,
}
