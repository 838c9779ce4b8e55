use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestCode(pub u64);

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a dispatch request as reported by the admin API.
///
/// The backend spells the initial state capitalized and the later states in
/// lowercase; `as_wire` reproduces those literals verbatim while parsing is
/// case-insensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pendente,
    Aceita,
    Recusada,
    Concluida,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] =
        [Self::Pendente, Self::Aceita, Self::Recusada, Self::Concluida];

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::Aceita => "aceita",
            Self::Recusada => "recusada",
            Self::Concluida => "concluida",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        let folded = fold_accents(raw);
        Self::ALL.into_iter().find(|status| status.as_wire().eq_ignore_ascii_case(&folded))
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pendente)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_wire(value).ok_or_else(|| DomainError::UnknownVariant {
            kind: "request status",
            value: value.to_string(),
        })
    }
}

impl Serialize for RequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Mototaxi,
    Entrega,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [Self::Mototaxi, Self::Entrega];

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Mototaxi => "Mototáxi",
            Self::Entrega => "Entrega",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        match fold_accents(raw).replace(['-', ' '], "").as_str() {
            "mototaxi" => Some(Self::Mototaxi),
            "entrega" => Some(Self::Entrega),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for ServiceKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_wire(value).ok_or_else(|| DomainError::UnknownVariant {
            kind: "service kind",
            value: value.to_string(),
        })
    }
}

impl Serialize for ServiceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for ServiceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Pix,
    Dinheiro,
    Cartao,
    Boleto,
    Other(String),
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Self {
        let folded = fold_accents(raw);
        match folded.as_str() {
            "pix" => Self::Pix,
            "dinheiro" => Self::Dinheiro,
            "boleto" => Self::Boleto,
            value if value.starts_with("cartao") => Self::Cartao,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pix => "Pix",
            Self::Dinheiro => "Dinheiro",
            Self::Cartao => "Cartão",
            Self::Boleto => "Boleto",
            Self::Other(value) => value,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|value| Self::parse(&value)).unwrap_or_default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    #[serde(rename = "usu_codigo", default)]
    pub user_code: Option<u64>,
    #[serde(rename = "usu_nome", default)]
    pub display_name: Option<String>,
}

impl Requester {
    pub fn label(&self) -> String {
        match (&self.display_name, self.user_code) {
            (Some(name), _) if !name.trim().is_empty() => name.trim().to_string(),
            (_, Some(code)) => format!("#{code}"),
            _ => "unknown".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(rename = "sol_codigo")]
    pub code: RequestCode,
    #[serde(rename = "sol_origem", default)]
    pub origin: String,
    #[serde(rename = "sol_destino", default)]
    pub destination: String,
    #[serde(rename = "sol_distancia", default, deserialize_with = "lenient_number")]
    pub distance_km: f64,
    #[serde(rename = "sol_valor")]
    pub value: Decimal,
    #[serde(rename = "sol_formapagamento", default)]
    pub payment_method: PaymentMethod,
    #[serde(rename = "sol_servico")]
    pub service: ServiceKind,
    #[serde(rename = "sol_largura", default, deserialize_with = "lenient_optional_number")]
    pub width: Option<f64>,
    #[serde(rename = "sol_comprimento", default, deserialize_with = "lenient_optional_number")]
    pub length: Option<f64>,
    #[serde(rename = "sol_peso", default, deserialize_with = "lenient_optional_number")]
    pub weight: Option<f64>,
    #[serde(rename = "sol_status")]
    pub status: RequestStatus,
    #[serde(flatten)]
    pub requester: Requester,
    #[serde(rename = "sol_observacoes", default)]
    pub notes: Option<String>,
    #[serde(rename = "sol_data", default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Request {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pendente
    }

    pub fn has_cargo(&self) -> bool {
        self.width.is_some() || self.length.is_some() || self.weight.is_some()
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self.status, next),
            (RequestStatus::Pendente, RequestStatus::Aceita)
                | (RequestStatus::Pendente, RequestStatus::Recusada)
        )
    }

    pub fn transition_to(&mut self, next: RequestStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidRequestTransition { code: self.code, from: self.status, to: next })
    }

    /// Passenger rides must not carry cargo dimensions. The backend does not
    /// enforce this, so violations are reported rather than rejected.
    pub fn cargo_anomaly(&self) -> Option<DomainError> {
        if self.service == ServiceKind::Mototaxi && self.has_cargo() {
            return Some(DomainError::InvariantViolation(format!(
                "request {} is a {} ride but carries cargo dimensions",
                self.code,
                self.service.as_wire()
            )));
        }
        None
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn fold_accents(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' => 'e',
            'í' | 'ì' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_f64<E: serde::de::Error>(self) -> Result<Option<f64>, E> {
        match self {
            Self::Number(value) => Ok(Some(value)),
            Self::Text(text) if text.trim().is_empty() => Ok(None),
            Self::Text(text) => text
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, found `{text}`"))),
        }
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient_optional_number(deserializer)?.unwrap_or_default())
}

fn lenient_optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(value) => value.into_f64(),
        None => Ok(None),
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp `{raw}`")))
}
