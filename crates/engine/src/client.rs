use std::future::Future;

use api_types::{
    ErrorResponse,
    group::GroupDto,
    order::{OrderDto, OrderStatusUpdate},
    page::Page,
    present::{Present, PresentPayload},
    user::UserDto,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url, multipart};
use serde::de::DeserializeOwned;

use crate::{
    credentials::Credentials,
    error::ClientError,
    paging::{Listing, PageQuery},
    status::OrderStatus,
    validation::{ImageFile, ValidGift},
};

type Result<T> = std::result::Result<T, ClientError>;

/// List-fetching side of the backend, the seam the loaders are written
/// against.
pub trait Backend: Sync {
    fn orders(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> impl Future<Output = Result<Listing<OrderDto>>> + Send;

    fn presents(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> impl Future<Output = Result<Listing<Present>>> + Send;

    fn users(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> impl Future<Output = Result<Listing<UserDto>>> + Send;

    fn groups(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> impl Future<Output = Result<Listing<GroupDto>>> + Send;
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let raw = base_url.trim();
        if raw.is_empty() {
            return Err(ClientError::InvalidUrl("missing base_url".to_string()));
        }
        let mut base_url =
            Url::parse(raw).map_err(|err| ClientError::InvalidUrl(format!("{raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(raw.to_string()));
        }
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
    ) -> Result<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))?;
        Ok(credentials.authorize(self.http.request(method, endpoint)))
    }

    async fn send(req: RequestBuilder) -> Result<Response> {
        let res = req.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("backend rejected credentials");
            return Err(ClientError::Unauthorized);
        }

        let message = error_message(res).await;
        tracing::warn!(%status, %message, "backend request failed");
        Err(ClientError::Http { status, message })
    }

    async fn fetch_listing<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        entity: &str,
        query: PageQuery,
    ) -> Result<Listing<T>> {
        tracing::debug!(entity, ?query, "fetching listing");
        match query {
            PageQuery::Page { index, size } => {
                let req = self
                    .request(Method::GET, entity, credentials)?
                    .query(&[("page", index), ("size", size)]);
                let page = Self::send(req).await?.json::<Page<T>>().await?;
                Ok(page.into())
            }
            PageQuery::All => {
                let req = self.request(Method::GET, &format!("{entity}/all"), credentials)?;
                let items = Self::send(req).await?.json::<Vec<T>>().await?;
                Ok(Listing::from_all(items))
            }
        }
    }

    /// Checks that the backend accepts `credentials` with the cheapest list
    /// call available.
    pub async fn verify(&self, credentials: &Credentials) -> Result<()> {
        self.fetch_listing::<OrderDto>(credentials, "orders", PageQuery::Page { index: 0, size: 1 })
            .await
            .map(|_| ())
    }

    pub async fn update_order_status(
        &self,
        credentials: &Credentials,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<()> {
        let req = self
            .request(
                Method::PATCH,
                &format!("orders/{order_id}/status"),
                credentials,
            )?
            .json(&OrderStatusUpdate {
                status: status.code().to_string(),
            });
        Self::send(req).await?;
        tracing::info!(order_id, status = status.code(), "order status updated");
        Ok(())
    }

    pub async fn create_present(
        &self,
        credentials: &Credentials,
        payload: &PresentPayload,
    ) -> Result<Present> {
        let req = self
            .request(Method::POST, "presents", credentials)?
            .json(payload);
        Ok(Self::send(req).await?.json::<Present>().await?)
    }

    pub async fn update_present(
        &self,
        credentials: &Credentials,
        present_id: i64,
        payload: &PresentPayload,
    ) -> Result<Present> {
        let req = self
            .request(Method::PUT, &format!("presents/{present_id}"), credentials)?
            .json(payload);
        Ok(Self::send(req).await?.json::<Present>().await?)
    }

    pub async fn delete_present(&self, credentials: &Credentials, present_id: i64) -> Result<()> {
        let req = self.request(Method::DELETE, &format!("presents/{present_id}"), credentials)?;
        Self::send(req).await?;
        tracing::info!(present_id, "present deleted");
        Ok(())
    }

    pub async fn upload_photo(
        &self,
        credentials: &Credentials,
        present_id: i64,
        image: &ImageFile,
    ) -> Result<()> {
        let bytes = tokio::fs::read(&image.path).await?;
        self.upload_photo_bytes(credentials, present_id, image, bytes)
            .await
    }

    async fn upload_photo_bytes(
        &self,
        credentials: &Credentials,
        present_id: i64,
        image: &ImageFile,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let part = multipart::Part::bytes(bytes)
            .file_name(image.file_name())
            .mime_str(&image.mime)?;
        let form = multipart::Form::new().part("file", part);
        let req = self
            .request(
                Method::POST,
                &format!("presents/{present_id}/photos"),
                credentials,
            )?
            .multipart(form);
        Self::send(req).await?;
        Ok(())
    }

    pub async fn photo(
        &self,
        credentials: &Credentials,
        present_id: i64,
        photo_id: i64,
    ) -> Result<Vec<u8>> {
        let req = self.request(
            Method::GET,
            &format!("presents/{present_id}/photos/{photo_id}"),
            credentials,
        )?;
        Ok(Self::send(req).await?.bytes().await?.to_vec())
    }

    /// Creates (`present_id == None`) or updates a gift, then uploads the
    /// new images one by one.
    ///
    /// Image files are read before anything is sent, so a missing file never
    /// leaves a half-saved gift behind. A failed upload after the gift was
    /// saved is reported as [`ClientError::UploadFailed`] with the gift id.
    pub async fn save_gift(
        &self,
        credentials: &Credentials,
        present_id: Option<i64>,
        gift: &ValidGift,
    ) -> Result<Present> {
        let mut files = Vec::with_capacity(gift.images.len());
        for image in &gift.images {
            files.push(tokio::fs::read(&image.path).await?);
        }

        let payload = gift.payload();
        let present = match present_id {
            Some(id) => self.update_present(credentials, id, &payload).await?,
            None => self.create_present(credentials, &payload).await?,
        };

        for (uploaded, (image, bytes)) in gift.images.iter().zip(files).enumerate() {
            if let Err(err) = self
                .upload_photo_bytes(credentials, present.id, image, bytes)
                .await
            {
                tracing::warn!(present_id = present.id, uploaded, %err, "photo upload failed");
                return Err(ClientError::UploadFailed {
                    present_id: present.id,
                    uploaded,
                    source: Box::new(err),
                });
            }
        }
        tracing::info!(
            present_id = present.id,
            images = gift.images.len(),
            "present saved"
        );
        Ok(present)
    }
}

impl Backend for Client {
    async fn orders(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<OrderDto>> {
        self.fetch_listing(credentials, "orders", query).await
    }

    async fn presents(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<Present>> {
        self.fetch_listing(credentials, "presents", query).await
    }

    async fn users(&self, credentials: &Credentials, query: PageQuery) -> Result<Listing<UserDto>> {
        self.fetch_listing(credentials, "users", query).await
    }

    async fn groups(
        &self,
        credentials: &Credentials,
        query: PageQuery,
    ) -> Result<Listing<GroupDto>> {
        self.fetch_listing(credentials, "groups", query).await
    }
}

async fn error_message(res: Response) -> String {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(ErrorResponse::text)
        .or_else(|| {
            let body = body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("errore sconosciuto")
                .to_string()
        })
}
