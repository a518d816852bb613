use anyhow::Result;
use console::style;
use volley::{Report, Response, Status};

use crate::options::Format;

pub fn color_response(response: &Response) -> String {
    let out = match &response.status {
        Status::Http(code) if code.is_success() => style(response).green().bright(),
        Status::Http(code) if code.is_redirection() => style(response),
        Status::Http(code) if code.is_client_error() => style(response).yellow().bright(),
        Status::Http(_) => style(response).red().bright(),
        Status::ConnectionError(_) => style(response).red().bright(),
    };
    out.to_string()
}

pub fn fmt(report: &Report, format: &Format) -> Result<String> {
    Ok(match format {
        Format::String => format!("\n--- Report ---\n{}", report),
        Format::Json => serde_json::to_string_pretty(report)?,
    })
}

#[cfg(test)]
mod test_super {
    use super::*;
    use http::StatusCode;
    use std::time::Duration;
    use volley::ResponseStats;

    fn report() -> Report {
        let mut stats = ResponseStats::new();
        stats.extend(vec![
            Response::new(0, Status::Http(StatusCode::OK)),
            Response::new(1, Status::Http(StatusCode::NOT_FOUND)),
            Response::new(2, Status::ConnectionError("refused".to_string())),
        ]);
        Report {
            elapsed: Duration::from_secs(2),
            stats,
        }
    }

    #[test]
    fn test_string_report() {
        let out = fmt(&report(), &Format::String).unwrap();
        assert!(out.contains("Elapsed time: 2.00s"));
        assert!(out.contains("Total requests: 3"));
        assert!(out.contains("Connection errors: 1"));
        assert!(out.contains("Status 200: 1"));
        assert!(out.contains("Status 404: 1"));
    }

    #[test]
    fn test_json_report() {
        let out = fmt(&report(), &Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["statuses"]["404"], 1);
        assert_eq!(value["statuses"]["0"], 1);
    }

    #[test]
    fn test_color_response_keeps_text() {
        let response = Response::new(6, Status::Http(StatusCode::OK));
        assert!(color_response(&response).contains("Request #7: Status 200"));
    }
}
