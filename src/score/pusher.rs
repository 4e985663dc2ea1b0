// Score push client
//
// Sends score snapshots to the display server. Fire-and-forget:
//
//   POST http://{host}:{port}/scores
//     Body: { teamAScore, teamBScore, teamAName, teamBName,
//             teamAPlayer, teamBPlayer, eventName }
//     Response: any 2xx; body ignored
//
// No retry and no queue. A lost update is superseded by the next score
// change, so outcomes are only logged.

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::snapshot::ScoreSnapshot;
use crate::config::constants::SCORES_PATH;
use crate::config::PushSettings;
use crate::service::ServiceAddress;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach display server: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Display server answered HTTP {0}")]
    Status(StatusCode),
}

/// Client for the display server's score endpoint.
#[derive(Clone)]
pub struct ScorePusher {
    http: Client,
}

impl ScorePusher {
    pub fn new(settings: &PushSettings) -> Result<Self, PushError> {
        let http = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.timeout())
            .build()
            .map_err(PushError::Client)?;
        Ok(Self { http })
    }

    /// Push `snapshot` to `address` on a detached task.
    ///
    /// Never fails and never blocks. The handle may be awaited to know the
    /// push has finished, or dropped.
    pub fn update_scores(
        &self,
        address: &ServiceAddress,
        snapshot: ScoreSnapshot,
    ) -> JoinHandle<()> {
        tracing::debug!(
            host = %address.host,
            port = address.port,
            team_a = snapshot.team_a_score,
            team_b = snapshot.team_b_score,
            "Updating scores"
        );

        let pusher = self.clone();
        let address = address.clone();
        tokio::spawn(async move {
            match pusher.send(&address, &snapshot).await {
                Ok(()) => tracing::debug!(%address, "Scores updated successfully"),
                Err(e) => tracing::error!(%address, error = %e, "Failed to update scores"),
            }
        })
    }

    async fn send(
        &self,
        address: &ServiceAddress,
        snapshot: &ScoreSnapshot,
    ) -> Result<(), PushError> {
        let url = format!("{}{}", address.base_url(), SCORES_PATH);
        // .json() sets Content-Type: application/json
        let resp = self
            .http
            .post(&url)
            .json(&snapshot.payload())
            .send()
            .await
            .map_err(PushError::Request)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PushError::Status(status));
        }
        Ok(())
    }
}
