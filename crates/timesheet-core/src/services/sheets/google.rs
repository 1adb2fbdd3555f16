//! Google Sheets destination
//!
//! Authenticates as a service account (signed JWT exchanged for an access
//! token) and appends rows through the Sheets v4 values API.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{SheetDestination, SheetRow};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Columns the report occupies
const DATA_COLUMNS: &str = "A:C";

/// Service account and target sheet
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub service_account_email: String,
    /// PEM private key; literal `\n` sequences are accepted
    pub private_key: String,
    pub spreadsheet_id: String,
    /// Numeric id (gid) of the tab to append to
    pub sheet_id: i64,
}

impl GoogleSheetsConfig {
    /// Private key with escaped newlines restored
    pub fn private_key_pem(&self) -> String {
        self.private_key.replace("\\n", "\n")
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetInfo {
    #[serde(default)]
    sheets: Vec<SheetInfo>,
}

#[derive(Debug, Deserialize)]
struct SheetInfo {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: Vec<&'a [super::CellValue]>,
}

/// Build the signed assertion for the service-account token exchange
pub fn build_assertion(config: &GoogleSheetsConfig, issued_at: i64) -> Result<String> {
    let claims = Claims {
        iss: &config.service_account_email,
        scope: SPREADSHEETS_SCOPE,
        aud: TOKEN_URL,
        iat: issued_at,
        exp: issued_at + 3600,
    };
    let key = EncodingKey::from_rsa_pem(config.private_key_pem().as_bytes())?;
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
}

/// Quote a tab title for A1 notation (`'My tab'!A:C`)
pub fn a1_range(sheet_title: &str, columns: &str) -> String {
    format!("'{}'!{}", sheet_title.replace('\'', "''"), columns)
}

/// Google Sheets tab opened for appending
pub struct GoogleSheetsDestination {
    client: Client,
    api_base: String,
    access_token: String,
    spreadsheet_id: String,
    sheet_title: String,
}

impl GoogleSheetsDestination {
    /// Authenticate and resolve the target tab
    pub async fn connect(config: &GoogleSheetsConfig) -> Result<Self> {
        let client = http_client()?;
        let assertion = build_assertion(config, chrono::Utc::now().timestamp())?;

        let response = client
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = parse_json(response).await?;
        log::debug!("[sheets] obtained access token for {}", config.service_account_email);

        let sheet_title = resolve_sheet_title(
            &client,
            SHEETS_API_BASE,
            &token.access_token,
            &config.spreadsheet_id,
            config.sheet_id,
        )
        .await?;

        Ok(Self::new(
            client,
            SHEETS_API_BASE,
            token.access_token,
            &config.spreadsheet_id,
            sheet_title,
        ))
    }

    /// Destination for an already-authenticated session
    pub fn new(
        client: Client,
        api_base: &str,
        access_token: String,
        spreadsheet_id: &str,
        sheet_title: String,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_title,
        }
    }

    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }

    fn values_url(&self, suffix: &str) -> Result<Url> {
        let range = format!("{}{}", a1_range(&self.sheet_title, DATA_COLUMNS), suffix);
        spreadsheet_url(&self.api_base, &self.spreadsheet_id, &["values", &range])
    }
}

#[async_trait]
impl SheetDestination for GoogleSheetsDestination {
    fn destination_name(&self) -> &'static str {
        "Google Sheets"
    }

    async fn next_writable_row(&self) -> Result<u32> {
        let response = self
            .client
            .get(self.values_url("")?)
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;
        let range: ValueRange = parse_json(response).await?;
        Ok(range.values.len() as u32 + 1)
    }

    async fn append_rows(&self, rows: &[SheetRow]) -> Result<()> {
        let body = AppendBody {
            values: rows.iter().map(|row| row.cells.as_slice()).collect(),
        };

        let response = self
            .client
            .post(self.values_url(":append")?)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await?;
        let _: serde_json::Value = parse_json(response).await?;
        Ok(())
    }
}

/// Look up the title of the tab with the given numeric id
pub async fn resolve_sheet_title(
    client: &Client,
    api_base: &str,
    access_token: &str,
    spreadsheet_id: &str,
    sheet_id: i64,
) -> Result<String> {
    let url = spreadsheet_url(api_base, spreadsheet_id, &[])?;
    let response = client
        .get(url)
        .bearer_auth(access_token)
        .query(&[("fields", "sheets.properties")])
        .send()
        .await?;
    let info: SpreadsheetInfo = parse_json(response).await?;

    info.sheets
        .into_iter()
        .find(|s| s.properties.sheet_id == sheet_id)
        .map(|s| s.properties.title)
        .ok_or_else(|| {
            Error::config(format!(
                "Sheet id {} not found in spreadsheet {}",
                sheet_id, spreadsheet_id
            ))
        })
}

fn spreadsheet_url(api_base: &str, spreadsheet_id: &str, rest: &[&str]) -> Result<Url> {
    let mut url = Url::parse(api_base)
        .map_err(|e| Error::config(format!("Invalid Sheets API URL '{}': {}", api_base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("Invalid Sheets API URL '{}'", api_base)))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id])
        .extend(rest);
    Ok(url)
}

fn http_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(Error::upstream("Google Sheets", status, text));
    }
    Ok(response.json().await?)
}
