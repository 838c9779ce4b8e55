use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use zoomx_core::config::ApiConfig;
use zoomx_core::domain::request::{Request, RequestCode};
use zoomx_core::domain::worker::Worker;
use zoomx_core::session::Session;

use crate::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey, IDEMPOTENCY_HEADER};

const REQUESTS_PATH: &str = "/api/admin/solicitacoes";
const APPROVE_PATH: &str = "/api/admin/solicitacoes/aceitar";
const REJECT_PATH: &str = "/api/admin/solicitacoes/recusar";
const WORKERS_PATH: &str = "/api/admin/funcionarios/ativos";

#[derive(Clone)]
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpAdminApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<Session>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::Transport(format!("failed to build http client: {error}")))?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), session })
    }

    pub fn from_config(config: &ApiConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeout(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attaches the bearer token held by the session right now. A session
    /// without credentials fails before anything is sent.
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.session.bearer_token().ok_or(ApiError::SessionExpired { status: None })?;
        Ok(builder.bearer_auth(token.expose_secret()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(
                event_name = "dispatch.api.session_rejected",
                status = status.as_u16(),
                "admin api rejected the session credentials"
            );
            return Err(ApiError::SessionExpired { status: Some(status.as_u16()) });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http { status: status.as_u16(), message: server_message(status, &body) })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        let bytes = response.bytes().await.map_err(|error| ApiError::Transport(error.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|error| ApiError::Decode(error.to_string()))
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError> {
        let requests: Vec<Request> = self.fetch(REQUESTS_PATH).await?;
        debug!(event_name = "dispatch.api.requests_listed", count = requests.len());
        Ok(requests)
    }

    async fn list_active_workers(&self) -> Result<Vec<Worker>, ApiError> {
        let workers: Vec<Worker> = self.fetch(WORKERS_PATH).await?;
        debug!(event_name = "dispatch.api.workers_listed", count = workers.len());
        Ok(workers)
    }

    async fn approve_request(
        &self,
        code: RequestCode,
        assignment: &ApprovalAssignment,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        let builder = self
            .client
            .post(self.url(&format!("{APPROVE_PATH}/{code}")))
            .header(IDEMPOTENCY_HEADER, key.as_str())
            .json(assignment);
        self.send(builder).await?;
        Ok(())
    }

    async fn reject_request(
        &self,
        code: RequestCode,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        let builder = self
            .client
            .post(self.url(&format!("{REJECT_PATH}/{code}")))
            .header(IDEMPOTENCY_HEADER, key.as_str());
        self.send(builder).await?;
        Ok(())
    }
}

/// Picks the human-readable message out of an error response.
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(message) = fields.get(key).and_then(Value::as_str) {
                if !message.trim().is_empty() {
                    return message.trim().to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status.canonical_reason().unwrap_or("request failed").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zoomx_core::domain::request::{RequestCode, RequestStatus, ServiceKind};
    use zoomx_core::domain::worker::{OperatorCode, WorkerCode};
    use zoomx_core::session::Session;

    use super::{server_message, HttpAdminApi};
    use crate::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey};

    fn session() -> Arc<Session> {
        Arc::new(Session::new(
            "tok-abc".to_string().into(),
            Some(OperatorCode(7)),
            Duration::from_millis(2_000),
        ))
    }

    fn client(server: &MockServer, session: Arc<Session>) -> HttpAdminApi {
        HttpAdminApi::new(&format!("{}/", server.uri()), Duration::from_secs(5), session)
            .expect("client builds")
    }

    #[tokio::test]
    async fn lists_requests_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/solicitacoes"))
            .and(header("authorization", "Bearer tok-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "sol_codigo": 42,
                    "sol_origem": "Rua A, 10",
                    "sol_destino": "Rua B, 20",
                    "sol_distancia": "3.5",
                    "sol_valor": 12.5,
                    "sol_formapagamento": "Pix",
                    "sol_servico": "Mototáxi",
                    "sol_status": "Pendente",
                    "usu_codigo": 5,
                    "usu_nome": "Ana"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let requests = client(&server, session()).list_requests().await.expect("list succeeds");

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].code, RequestCode(42));
        assert_eq!(requests[0].service, ServiceKind::Mototaxi);
        assert_eq!(requests[0].status, RequestStatus::Pendente);
    }

    #[tokio::test]
    async fn forbidden_maps_to_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/solicitacoes"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let error = client(&server, session()).list_requests().await.expect_err("403 fails");
        assert_eq!(error, ApiError::SessionExpired { status: Some(403) });
    }

    #[tokio::test]
    async fn unauthorized_is_treated_like_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/funcionarios/ativos"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let error =
            client(&server, session()).list_active_workers().await.expect_err("401 fails");
        assert!(error.is_session_expired());
    }

    #[tokio::test]
    async fn torn_down_session_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session();
        session.teardown();
        let error = client(&server, session).list_requests().await.expect_err("no token");

        assert_eq!(error, ApiError::SessionExpired { status: None });
    }

    #[tokio::test]
    async fn approve_posts_assignment_with_idempotency_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/solicitacoes/aceitar/42"))
            .and(header("Idempotency-Key", "key-1"))
            .and(body_json(json!({ "fun_codigo": 3, "ate_codigo": 7 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let assignment = ApprovalAssignment { worker: WorkerCode(3), operator: OperatorCode(7) };
        client(&server, session())
            .approve_request(RequestCode(42), &assignment, &IdempotencyKey::from("key-1"))
            .await
            .expect("approve succeeds");
    }

    #[tokio::test]
    async fn reject_posts_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/solicitacoes/recusar/9"))
            .and(header_exists("Idempotency-Key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, session())
            .reject_request(RequestCode(9), &IdempotencyKey::generate())
            .await
            .expect("reject succeeds");

        let received = server.received_requests().await.expect("recording enabled");
        assert_eq!(received.len(), 1);
        assert!(received[0].body.is_empty());
    }

    #[tokio::test]
    async fn server_message_is_surfaced_on_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/solicitacoes/recusar/9"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "Solicitação já foi processada" })),
            )
            .mount(&server)
            .await;

        let error = client(&server, session())
            .reject_request(RequestCode(9), &IdempotencyKey::generate())
            .await
            .expect_err("conflict fails");

        assert_eq!(
            error,
            ApiError::Http { status: 409, message: "Solicitação já foi processada".to_string() }
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/solicitacoes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let error = client(&server, session()).list_requests().await.expect_err("decode fails");
        assert!(matches!(error, ApiError::Decode(_)));
    }

    #[test]
    fn server_message_falls_back_through_body_shapes() {
        assert_eq!(
            server_message(StatusCode::BAD_REQUEST, r#"{"error":"worker inativo"}"#),
            "worker inativo"
        );
        assert_eq!(server_message(StatusCode::BAD_REQUEST, r#"{"msg":"falhou"}"#), "falhou");
        assert_eq!(
            server_message(StatusCode::INTERNAL_SERVER_ERROR, "  database down \n"),
            "database down"
        );
        assert_eq!(server_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }
}
