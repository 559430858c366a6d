use anyhow::{bail, Context};
use common::{
    model::{
        choice::Choice,
        frame::{FrameActionPayload, RenderDescriptor, StepId},
        transaction::TransactionResponse,
    },
    reqwest::{self, header},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::strategy::{Round, Strategy};

const CHECK_RESULT_BUTTON: u8 = 4;

/// What one wager produced: the call to sign and the frame shown afterwards.
#[derive(Debug)]
pub struct Wager {
    pub choice: Choice,
    pub transaction: TransactionResponse,
    pub callback: RenderDescriptor,
}

/// Walks the frame flow over http, asking for JSON instead of frame documents.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    strategy: Box<dyn Strategy>,
    history: Vec<Round>,
}

impl Client {
    pub fn new(base_url: impl Into<String>, strategy: Box<dyn Strategy>) -> Self {
        Client {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            strategy,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Round] {
        &self.history
    }

    pub async fn start(&self) -> anyhow::Result<RenderDescriptor> {
        let response = self
            .http
            .get(self.endpoint(&format!("api/frame/{}", StepId::Start)))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Picks a choice, fetches its unsigned transaction, then posts the
    /// wallet callback the frame would receive once the transaction is sent.
    pub async fn play(&mut self) -> anyhow::Result<Wager> {
        let choice = self.strategy.make_move(&self.history);
        info!("Playing {}", choice);

        let response = self
            .http
            .post(self.endpoint(&format!("api/bet/{}", choice.name().to_lowercase())))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("bet request failed with {}: {}", status, body);
        }
        let transaction: TransactionResponse = response
            .json()
            .await
            .context("malformed transaction response")?;
        debug!("Unsigned transaction {:?}", transaction);

        let callback = self
            .post_frame(StepId::Start, &FrameActionPayload::button(choice.code_of() + 1))
            .await?;
        self.history.push(Round {
            my_choice: choice,
            headline: callback.view.headline.clone(),
        });
        Ok(Wager {
            choice,
            transaction,
            callback,
        })
    }

    /// Check Result from the start frame, then submit the address.
    pub async fn check_result(&self, address: &str) -> anyhow::Result<RenderDescriptor> {
        let prompt = self
            .post_frame(StepId::Start, &FrameActionPayload::button(CHECK_RESULT_BUTTON))
            .await?;
        debug!("Prompted with {:?}", prompt.view.headline);
        self.post_frame(prompt.next_action, &FrameActionPayload::text(1, address))
            .await
    }

    async fn post_frame(
        &self,
        step: StepId,
        payload: &impl Serialize,
    ) -> anyhow::Result<RenderDescriptor> {
        let response = self
            .http
            .post(self.endpoint(&format!("api/frame/{}", step)))
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("frame step {} failed", step))?;
        Ok(response.json().await?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
