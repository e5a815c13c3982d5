use std::env;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::http_client::http_client;
use crate::state::PrimaryPlayerProp;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: Option<String>,
    pub model: String,
}

impl InsightConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let model = env::var("GEMINI_MODEL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self { api_key, model }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// One generated insight, keyed to a player by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInsight {
    #[serde(rename = "playerName")]
    pub player_name: String,
    /// "MORE" or "LESS" as predicted by the model.
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub reason: String,
}

pub fn generate_insights(
    cfg: &InsightConfig,
    market_key: &str,
    bookmaker_title: &str,
    props: &[PrimaryPlayerProp],
) -> Result<Vec<PlayerInsight>> {
    let Some(api_key) = cfg.api_key.as_ref() else {
        return Err(anyhow!("GEMINI_API_KEY missing"));
    };

    let context = build_structural_context(props);
    let prompt = build_prompt(market_key, bookmaker_title, &context);
    let body = json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "playerName": {"type": "STRING"},
                        "prediction": {"type": "STRING", "description": "Must be 'MORE' or 'LESS'"},
                        "reason": {"type": "STRING"}
                    },
                    "required": ["playerName", "prediction", "reason"]
                }
            }
        }
    });

    let url = format!("{GEMINI_BASE_URL}/{}:generateContent", cfg.model);
    let client = http_client()?;
    let resp = client
        .post(&url)
        .query(&[("key", api_key.as_str())])
        .json(&body)
        .send()
        .context("insight request failed")?;
    let status = resp.status();
    let raw = resp.text().context("failed reading insight body")?;
    if !status.is_success() {
        return Err(anyhow!("insight http {}: {}", status, snippet(&raw)));
    }

    let envelope: Value = serde_json::from_str(&raw).context("invalid insight json")?;
    let text = extract_candidate_text(&envelope)
        .ok_or_else(|| anyhow!("insight response had no candidate text"))?;
    Ok(parse_insights_json(text))
}

/// Per-player structural context for the prompt: line, lean, consensus, role,
/// and the raw per-book prices. EMR values and risk buckets are computed
/// locally and are never sent, so the generator cannot just restate them.
pub fn build_structural_context(props: &[PrimaryPlayerProp]) -> Value {
    let players: Vec<Value> = props
        .iter()
        .map(|prop| {
            let offers: Vec<Value> = prop
                .offers
                .iter()
                .map(|offer| {
                    json!({
                        "bookmaker": offer.bookmaker_title,
                        "overPrice": offer.over_price,
                        "underPrice": offer.under_price,
                    })
                })
                .collect();
            json!({
                "playerName": prop.player_name,
                "team": prop.team,
                "line": prop.line,
                "marketLean": prop.lean.map(|l| l.label()),
                "consensus": prop.consensus.label(),
                "parlayRole": prop.role.label(),
                "offers": offers,
            })
        })
        .collect();
    Value::Array(players)
}

pub fn build_prompt(market_key: &str, bookmaker_title: &str, context: &Value) -> String {
    format!(
        "You are a professional NBA betting analyst. Task: build a parlay for the {market_key} market.\n\
         Analyze the provided market consensus and the data from bookmaker \"{bookmaker_title}\".\n\n\
         Data: {context}\n\n\
         For EVERY player, predict if they will go MORE (Over) or LESS (Under) the line.\n\
         Include a short reasoning (max 12 words) based on the bookmaker odds and consensus."
    )
}

/// Pull the generated text out of a Gemini generateContent envelope.
pub fn extract_candidate_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Parse the model's JSON output. Anything that is not an array of insight
/// objects becomes an empty list; a flaky generation must not break the UI.
pub fn parse_insights_json(text: &str) -> Vec<PlayerInsight> {
    match serde_json::from_str::<Vec<PlayerInsight>>(text) {
        Ok(list) => list,
        Err(_) => Vec::new(),
    }
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .chars()
        .take(220)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ConsensusStrength, MarketLean, ParlayRole, PlayerOffer};

    fn sample_prop() -> PrimaryPlayerProp {
        PrimaryPlayerProp {
            player_name: "Jayson Tatum".to_string(),
            market_key: "player_points".to_string(),
            line: 27.5,
            team: Some("BOS".to_string()),
            offers: vec![PlayerOffer {
                bookmaker: "draftkings".to_string(),
                bookmaker_title: "DraftKings".to_string(),
                over_price: Some(-115.0),
                under_price: Some(-105.0),
            }],
            consensus: ConsensusStrength::High,
            role: ParlayRole::Support,
            lean: Some(MarketLean::More),
            avg_over_price: -115.0,
            avg_under_price: -105.0,
            notable: false,
        }
    }

    #[test]
    fn structural_context_excludes_risk_fields() {
        let context = build_structural_context(&[sample_prop()]);
        let serialized = context.to_string();
        assert!(serialized.contains("\"playerName\":\"Jayson Tatum\""));
        assert!(serialized.contains("\"consensus\":\"High\""));
        assert!(serialized.contains("\"marketLean\":\"MORE\""));
        assert!(!serialized.to_lowercase().contains("emr"));
        assert!(!serialized.contains("Miss Risk"));
    }

    #[test]
    fn prompt_names_market_and_bookmaker() {
        let context = build_structural_context(&[sample_prop()]);
        let prompt = build_prompt("player_points", "DraftKings", &context);
        assert!(prompt.contains("player_points"));
        assert!(prompt.contains("\"DraftKings\""));
        assert!(prompt.contains("MORE (Over) or LESS (Under)"));
    }

    #[test]
    fn extracts_candidate_text_from_envelope() {
        let envelope: Value = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_candidate_text(&envelope), Some("[]"));
        assert_eq!(extract_candidate_text(&json!({})), None);
    }

    #[test]
    fn parses_insight_arrays_and_tolerates_garbage() {
        let good = r#"[{"playerName": "Jayson Tatum", "prediction": "MORE", "reason": "short juice"}]"#;
        let parsed = parse_insights_json(good);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].player_name, "Jayson Tatum");
        assert_eq!(parsed[0].prediction.as_deref(), Some("MORE"));

        assert!(parse_insights_json("not json").is_empty());
        assert!(parse_insights_json("{\"oops\": 1}").is_empty());
    }
}
