//! Nominatim reverse-geocoding client.
//!
//! # Responsibility
//! - Issue one `GET /reverse` request per lookup.
//! - Map the address object to `PlaceMeta`.
//!
//! # Invariants
//! - City resolves through `city -> town -> village -> county`.
//! - Blank response strings are treated as absent.

use crate::geocode::ReverseGeocoder;
use crate::model::place::{Coordinates, PlaceMeta};
use log::{debug, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const REVERSE_ZOOM: &str = "10";

/// Failure of one lookup. Only logged; callers get empty meta.
#[derive(Debug)]
pub enum GeocodeError {
    Http(Box<ureq::Error>),
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for GeocodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "reverse geocode request failed: {err}"),
            Self::Io(err) => write!(f, "reverse geocode body unreadable: {err}"),
            Self::Parse(err) => write!(f, "reverse geocode response malformed: {err}"),
        }
    }
}

impl Error for GeocodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err.as_ref()),
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<ureq::Error> for GeocodeError {
    fn from(value: ureq::Error) -> Self {
        Self::Http(Box::new(value))
    }
}

impl From<std::io::Error> for GeocodeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Connection settings for [`NominatimClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominatimSettings {
    /// Full reverse endpoint, e.g. `https://nominatim.openstreetmap.org/reverse`.
    pub endpoint: String,
    /// Sent as `User-Agent`; Nominatim rejects anonymous clients.
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Blocking HTTP client for the Nominatim reverse endpoint.
pub struct NominatimClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl NominatimClient {
    pub fn new(settings: &NominatimSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent)
            .build();
        Self {
            agent,
            endpoint: settings.endpoint.clone(),
        }
    }

    /// Performs the request and surfaces every failure.
    pub fn try_lookup(&self, coordinates: Coordinates) -> Result<PlaceMeta, GeocodeError> {
        let body = self
            .agent
            .get(&self.endpoint)
            .query("format", "json")
            .query("lat", &coordinates.lat.to_string())
            .query("lon", &coordinates.lng.to_string())
            .query("zoom", REVERSE_ZOOM)
            .query("addressdetails", "1")
            .call()?
            .into_string()?;
        parse_reverse_response(&body)
    }
}

impl ReverseGeocoder for NominatimClient {
    fn lookup(&self, coordinates: Coordinates) -> PlaceMeta {
        let started_at = Instant::now();
        match self.try_lookup(coordinates) {
            Ok(meta) => {
                debug!(
                    "event=geocode module=geocode status=ok duration_ms={} has_city={}",
                    started_at.elapsed().as_millis(),
                    meta.city.is_some()
                );
                meta
            }
            Err(err) => {
                warn!(
                    "event=geocode module=geocode status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                PlaceMeta::default()
            }
        }
    }
}

/// Maps a reverse-geocode JSON body to enrichment fields.
pub fn parse_reverse_response(body: &str) -> Result<PlaceMeta, GeocodeError> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    let address = response.address;
    let city = address.as_ref().and_then(|address| {
        [
            &address.city,
            &address.town,
            &address.village,
            &address.county,
        ]
        .into_iter()
        .find_map(|candidate| non_blank(candidate.as_deref()))
    });
    let country = address
        .as_ref()
        .and_then(|address| non_blank(address.country.as_deref()));

    Ok(PlaceMeta {
        display_name: non_blank(response.display_name.as_deref()),
        city,
        country,
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{parse_reverse_response, NominatimClient, NominatimSettings};
    use crate::geocode::ReverseGeocoder;
    use crate::model::place::{Coordinates, PlaceMeta};
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    struct CapturedRequest {
        request_line: String,
        headers: Vec<String>,
    }

    /// Answers exactly one HTTP request on a loopback port.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/reverse", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                headers.push(line.trim_end().to_ascii_lowercase());
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
            }
        });
        (endpoint, handle)
    }

    fn client(endpoint: String) -> NominatimClient {
        NominatimClient::new(&NominatimSettings {
            endpoint,
            user_agent: "placemark-test/0.1".to_string(),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn lookup_sends_reverse_query_and_maps_address() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"display_name": "Jersey City, USA", "address": {"city": "Jersey City", "country": "USA"}}"#,
        );

        let meta = client(endpoint).lookup(Coordinates::new(40.5, -74.25).unwrap());
        let request = server.join().unwrap();

        let (method_and_path, _) = request.request_line.rsplit_once(' ').unwrap();
        let (method, target) = method_and_path.split_once(' ').unwrap();
        assert_eq!(method, "GET");
        let (path, query) = target.split_once('?').unwrap();
        assert_eq!(path, "/reverse");
        let params: Vec<&str> = query.split('&').collect();
        assert_eq!(
            params,
            vec![
                "format=json",
                "lat=40.5",
                "lon=-74.25",
                "zoom=10",
                "addressdetails=1"
            ]
        );
        assert!(request
            .headers
            .iter()
            .any(|header| header == "user-agent: placemark-test/0.1"));

        assert_eq!(meta.city.as_deref(), Some("Jersey City"));
        assert_eq!(meta.country.as_deref(), Some("USA"));
        assert_eq!(meta.display_name.as_deref(), Some("Jersey City, USA"));
    }

    #[test]
    fn http_error_status_yields_empty_meta() {
        let (endpoint, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#);

        let meta = client(endpoint).lookup(Coordinates::new(1.0, 2.0).unwrap());
        server.join().unwrap();
        assert_eq!(meta, PlaceMeta::default());
    }

    #[test]
    fn unreachable_endpoint_yields_empty_meta() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/reverse", listener.local_addr().unwrap());
        drop(listener);

        let client = client(endpoint);
        assert!(client.try_lookup(Coordinates::new(1.0, 2.0).unwrap()).is_err());
        assert_eq!(
            client.lookup(Coordinates::new(1.0, 2.0).unwrap()),
            PlaceMeta::default()
        );
    }

    #[test]
    fn city_falls_back_through_town_village_county() {
        let town = parse_reverse_response(r#"{"address": {"town": "Hoboken", "county": "Hudson"}}"#)
            .unwrap();
        assert_eq!(town.city.as_deref(), Some("Hoboken"));

        let village =
            parse_reverse_response(r#"{"address": {"village": "Elm", "county": "Hudson"}}"#)
                .unwrap();
        assert_eq!(village.city.as_deref(), Some("Elm"));

        let county = parse_reverse_response(r#"{"address": {"city": " ", "county": "Hudson"}}"#)
            .unwrap();
        assert_eq!(county.city.as_deref(), Some("Hudson"));
    }

    #[test]
    fn error_payload_yields_empty_meta() {
        let meta = parse_reverse_response(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(parse_reverse_response("<html>").is_err());
    }
}
