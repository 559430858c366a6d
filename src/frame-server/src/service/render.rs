//! Serializes render descriptors into Farcaster frame documents and draws
//! views as SVG cards.

use common::{
    model::{
        choice::Choice,
        frame::{Intent, RenderDescriptor, StepId, Tone, View},
    },
    reqwest::Url,
};
use itertools::Itertools;

use crate::model::external::ImageQuery;

pub const TITLE: &str = "Frame RPS Bet";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;
const HEADLINE_CHARS: usize = 36;
const DETAIL_CHARS: usize = 56;

/// Absolute links handed out in frame documents, rooted at the public url.
#[derive(Debug, Clone)]
pub struct Links {
    base: Url,
}

impl Links {
    pub fn new(base: Url) -> Self {
        Links { base }
    }

    pub fn frame(&self, step: StepId) -> Url {
        self.endpoint(&format!("/api/frame/{}", step))
    }

    pub fn bet(&self, choice: Choice) -> Url {
        self.endpoint(&format!("/api/bet/{}", choice.name().to_lowercase()))
    }

    pub fn reset(&self) -> Url {
        self.endpoint("/api/reset")
    }

    pub fn image(&self, view: &View) -> Url {
        let query = ImageQuery::from(view);
        let mut url = self.endpoint("/api/image");
        url.query_pairs_mut()
            .append_pair("headline", &query.headline)
            .append_pair("details", &query.details)
            .append_pair("tone", tone_name(query.tone));
        url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{}", self.base.path().trim_end_matches('/'), path));
        url.set_query(None);
        url
    }
}

fn tone_name(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "neutral",
        Tone::Highlight => "highlight",
        Tone::Warning => "warning",
    }
}

/// `fc:frame` meta tags for a descriptor, in document order.
pub fn frame_meta(descriptor: &RenderDescriptor, links: &Links) -> Vec<(String, String)> {
    let image = links.image(&descriptor.view).to_string();
    let mut tags = vec![
        ("og:title".to_owned(), TITLE.to_owned()),
        ("og:image".to_owned(), image.clone()),
        ("fc:frame".to_owned(), "vNext".to_owned()),
        ("fc:frame:image".to_owned(), image),
        ("fc:frame:image:aspect_ratio".to_owned(), "1.91:1".to_owned()),
        (
            "fc:frame:post_url".to_owned(),
            links.frame(descriptor.next_action).to_string(),
        ),
    ];
    if let Some(placeholder) = descriptor.text_input() {
        tags.push(("fc:frame:input:text".to_owned(), placeholder.to_owned()));
    }
    for (index, intent) in descriptor.buttons().enumerate() {
        let button = format!("fc:frame:button:{}", index + 1);
        match intent {
            Intent::Transaction { label, choice } => {
                tags.push((button.clone(), label.clone()));
                tags.push((format!("{}:action", button), "tx".to_owned()));
                tags.push((format!("{}:target", button), links.bet(*choice).to_string()));
                // Wallet callbacks always land back on the start frame
                tags.push((
                    format!("{}:post_url", button),
                    links.frame(StepId::Start).to_string(),
                ));
            }
            Intent::Action { label, target } => {
                tags.push((button.clone(), label.clone()));
                tags.push((format!("{}:action", button), "post".to_owned()));
                tags.push((format!("{}:target", button), links.frame(*target).to_string()));
            }
            Intent::Reset { label } => {
                tags.push((button.clone(), label.clone()));
                tags.push((format!("{}:action", button), "post".to_owned()));
                tags.push((format!("{}:target", button), links.reset().to_string()));
            }
            Intent::TextInput { .. } => {}
        }
    }
    tags
}

pub fn frame_html(descriptor: &RenderDescriptor, links: &Links) -> String {
    let meta = frame_meta(descriptor, links)
        .iter()
        .map(|(property, content)| {
            format!(
                r#"    <meta property="{}" content="{}">"#,
                escape(property),
                escape(content)
            )
        })
        .join("\n");
    let details = descriptor
        .view
        .details
        .iter()
        .map(|line| format!("    <p>{}</p>", escape(line)))
        .join("\n");
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    <title>{title}</title>\n{meta}\n  </head>\n  <body>\n    <h1>{headline}</h1>\n{details}\n  </body>\n</html>\n",
        title = TITLE,
        meta = meta,
        headline = escape(&descriptor.view.headline),
        details = details,
    )
}

/// 1.91:1 card with the headline and detail lines centered.
pub fn view_svg(view: &View) -> String {
    let background = match view.tone {
        Tone::Neutral => "black",
        Tone::Highlight => "url(#highlight)",
        Tone::Warning => "#4a1414",
    };
    let headline = wrap(&view.headline, HEADLINE_CHARS);
    let details: Vec<String> = view
        .details
        .iter()
        .flat_map(|line| wrap(line, DETAIL_CHARS))
        .collect();

    let block = headline.len() as u32 * 64 + details.len() as u32 * 44;
    let mut y = HEIGHT.saturating_sub(block) / 2 + 50;
    let mut lines = Vec::with_capacity(headline.len() + details.len());
    for line in headline {
        lines.push(text_line(&line, y, 50));
        y += 64;
    }
    for line in details {
        lines.push(text_line(&line, y, 32));
        y += 44;
    }

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <defs>
    <linearGradient id="highlight" x1="0" y1="0" x2="1" y2="0">
      <stop offset="0" stop-color="#432889"/>
      <stop offset="1" stop-color="#17101F"/>
    </linearGradient>
  </defs>
  <rect width="100%" height="100%" fill="{background}"/>
{lines}
</svg>
"##,
        w = WIDTH,
        h = HEIGHT,
        background = background,
        lines = lines.join("\n"),
    )
}

fn text_line(text: &str, y: u32, font_size: u32) -> String {
    format!(
        r#"  <text x="{}" y="{}" font-family="sans-serif" font-size="{}" fill="white" text-anchor="middle">{}</text>"#,
        WIDTH / 2,
        y,
        font_size,
        escape(text)
    )
}

// Greedy word wrap; a single overlong word keeps its own line
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = vec![];
    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_owned()),
        }
    }
    lines
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Links {
        Links::new(Url::parse("https://rps.example/").unwrap())
    }

    fn start() -> RenderDescriptor {
        RenderDescriptor {
            view: View {
                headline: "Welcome to Rock, Paper, Scissors!".to_owned(),
                details: vec![],
                tone: Tone::Neutral,
            },
            next_action: StepId::Start,
            valid_inputs: vec![
                Intent::Transaction {
                    label: "Rock".to_owned(),
                    choice: Choice::Rock,
                },
                Intent::Action {
                    label: "Check Result".to_owned(),
                    target: StepId::CollectAddress,
                },
            ],
        }
    }

    fn tag<'a>(tags: &'a [(String, String)], property: &str) -> Option<&'a str> {
        tags.iter()
            .find(|(p, _)| p == property)
            .map(|(_, content)| content.as_str())
    }

    #[test]
    fn links_respect_base_path() {
        let links = Links::new(Url::parse("https://rps.example/frames/").unwrap());
        assert_eq!(
            links.frame(StepId::ShowResult).as_str(),
            "https://rps.example/frames/api/frame/show-result"
        );
        assert_eq!(
            links.bet(Choice::Scissors).as_str(),
            "https://rps.example/frames/api/bet/scissors"
        );
        assert_eq!(links.reset().as_str(), "https://rps.example/frames/api/reset");
    }

    #[test]
    fn image_link_carries_view() {
        let view = View {
            headline: "Game Result".to_owned(),
            details: vec!["Winner: 0xDEF".to_owned(), "Reward: 0.002 ETH".to_owned()],
            tone: Tone::Highlight,
        };
        let url = links().image(&view);
        let query: ImageQuery =
            serde_json::from_value(serde_json::Value::Object(
                url.query_pairs()
                    .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
                    .collect(),
            ))
            .unwrap();
        assert_eq!(View::from(query), view);
    }

    #[test]
    fn buttons_are_numbered_with_targets() {
        let tags = frame_meta(&start(), &links());
        assert_eq!(tag(&tags, "fc:frame"), Some("vNext"));
        assert_eq!(
            tag(&tags, "fc:frame:post_url"),
            Some("https://rps.example/api/frame/start")
        );
        assert_eq!(tag(&tags, "fc:frame:button:1"), Some("Rock"));
        assert_eq!(tag(&tags, "fc:frame:button:1:action"), Some("tx"));
        assert_eq!(
            tag(&tags, "fc:frame:button:1:target"),
            Some("https://rps.example/api/bet/rock")
        );
        assert_eq!(tag(&tags, "fc:frame:button:2"), Some("Check Result"));
        assert_eq!(tag(&tags, "fc:frame:button:2:action"), Some("post"));
        assert_eq!(
            tag(&tags, "fc:frame:button:2:target"),
            Some("https://rps.example/api/frame/collect-address")
        );
        assert_eq!(tag(&tags, "fc:frame:input:text"), None);
    }

    #[test]
    fn text_input_does_not_take_a_button_slot() {
        let descriptor = RenderDescriptor {
            view: View {
                headline: "Check your result".to_owned(),
                details: vec![],
                tone: Tone::Neutral,
            },
            next_action: StepId::ShowResult,
            valid_inputs: vec![
                Intent::TextInput {
                    placeholder: "0x...".to_owned(),
                },
                Intent::Reset {
                    label: "Play Again".to_owned(),
                },
            ],
        };
        let tags = frame_meta(&descriptor, &links());
        assert_eq!(tag(&tags, "fc:frame:input:text"), Some("0x..."));
        assert_eq!(tag(&tags, "fc:frame:button:1"), Some("Play Again"));
        assert_eq!(
            tag(&tags, "fc:frame:button:1:target"),
            Some("https://rps.example/api/reset")
        );
        assert_eq!(tag(&tags, "fc:frame:button:2"), None);
    }

    #[test]
    fn html_is_escaped() {
        let mut descriptor = start();
        descriptor.view.headline = "<script>\"x\" & y</script>".to_owned();
        let html = frame_html(&descriptor, &links());
        assert!(html.contains("<title>Frame RPS Bet</title>"));
        assert!(html.contains("<h1>&lt;script&gt;&quot;x&quot; &amp; y&lt;/script&gt;</h1>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<meta property="fc:frame:button:1:action" content="tx">"#));
    }

    #[test]
    fn svg_background_follows_tone() {
        let mut view = start().view;
        assert!(view_svg(&view).contains(r#"fill="black""#));
        view.tone = Tone::Highlight;
        assert!(view_svg(&view).contains(r#"fill="url(#highlight)""#));
    }

    #[test]
    fn wrap_splits_on_words() {
        assert_eq!(
            wrap("You chose Rock. Please wait for an opponent...", 20),
            ["You chose Rock.", "Please wait for an", "opponent..."]
        );
        assert!(wrap("", 20).is_empty());
    }
}
