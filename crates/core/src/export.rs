//! CSV report of the requests table.

use std::io;

use thiserror::Error;

use crate::domain::request::Request;

const HEADER: [&str; 13] = [
    "codigo",
    "data",
    "servico",
    "status",
    "origem",
    "destino",
    "distancia_km",
    "valor",
    "forma_pagamento",
    "solicitante",
    "largura",
    "comprimento",
    "peso",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not flush report: {0}")]
    Io(#[from] io::Error),
}

/// Writes one row per request, in the given order. Returns the row count.
pub fn write_csv<W: io::Write>(writer: W, requests: &[&Request]) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for request in requests {
        csv.write_record([
            request.code.to_string(),
            request.created_at.map(|at| at.to_rfc3339()).unwrap_or_default(),
            request.service.as_wire().to_string(),
            request.status.as_wire().to_string(),
            request.origin.clone(),
            request.destination.clone(),
            format!("{:.2}", request.distance_km),
            request.value.round_dp(2).to_string(),
            request.payment_method.label().to_string(),
            request.requester.label(),
            optional_dimension(request.width),
            optional_dimension(request.length),
            optional_dimension(request.weight),
        ])?;
    }

    csv.flush()?;
    Ok(requests.len())
}

fn optional_dimension(value: Option<f64>) -> String {
    value.map(|value| format!("{value}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::write_csv;
    use crate::domain::request::{
        PaymentMethod, Request, RequestCode, RequestStatus, Requester, ServiceKind,
    };

    fn delivery() -> Request {
        Request {
            code: RequestCode(31),
            origin: "Centro, Loja 4".to_string(),
            destination: "Bairro Novo".to_string(),
            distance_km: 7.25,
            value: Decimal::new(2490, 2),
            payment_method: PaymentMethod::Cartao,
            service: ServiceKind::Entrega,
            width: Some(30.0),
            length: Some(45.5),
            weight: None,
            status: RequestStatus::Aceita,
            requester: Requester { user_code: Some(4), display_name: Some("Rita".to_string()) },
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn writes_header_and_quoted_rows() {
        let request = delivery();
        let mut buffer = Vec::new();

        let rows = write_csv(&mut buffer, &[&request]).expect("export succeeds");
        let output = String::from_utf8(buffer).expect("utf8 output");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(rows, 1);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("codigo,data,servico,status"));
        assert_eq!(
            lines[1],
            "31,,Entrega,aceita,\"Centro, Loja 4\",Bairro Novo,7.25,24.90,Cartão,Rita,30,45.5,"
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut buffer = Vec::new();
        let rows = write_csv(&mut buffer, &[]).expect("export succeeds");

        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(buffer).expect("utf8").lines().count(), 1);
    }
}
