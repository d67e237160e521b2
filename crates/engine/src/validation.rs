//! Client-side checks for the gift form.
//!
//! Validation is pure: it looks only at the form, runs once on submit and
//! reports every failing field at once.
use std::{collections::BTreeMap, fmt, path::Path, path::PathBuf};

use api_types::present::PresentPayload;
use thiserror::Error;

pub const PRICE_RANGE: (i64, i64) = (1, 9999);
pub const STOCK_RANGE: (i64, i64) = (1, 999);
pub const MAX_IMAGES: usize = 8;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Price,
    Stock,
    Images,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Name => "Nome",
            Self::Price => "Prezzo",
            Self::Stock => "Disponibilità",
            Self::Images => "Immagini",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("campo obbligatorio")]
    Required,
    #[error("deve essere un numero intero")]
    NotAnInteger,
    #[error("deve essere compreso tra {min} e {max}")]
    OutOfRange { min: i64, max: i64 },
    #[error("almeno un'immagine è obbligatoria")]
    MissingImage,
    #[error("formato non supportato: {0}")]
    UnsupportedImage(String),
    #[error("massimo 8 immagini")]
    TooManyImages,
}

pub type FieldErrors = BTreeMap<Field, FieldError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub mime: String,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }

    /// Guesses the MIME type from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let mime = match ext.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        };
        Self::new(path, mime)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing a gift that already has `existing_photos` photos.
    Edit { existing_photos: usize },
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GiftForm {
    pub name: String,
    pub price: String,
    pub stock: String,
    pub images: Vec<ImageFile>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidGift {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub images: Vec<ImageFile>,
}

impl ValidGift {
    pub fn payload(&self) -> PresentPayload {
        PresentPayload {
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
        }
    }
}

pub fn validate_gift_form(form: &GiftForm, mode: FormMode) -> Result<ValidGift, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, FieldError::Required);
    }

    let price = match parse_in_range(&form.price, PRICE_RANGE) {
        Ok(price) => Some(price),
        Err(err) => {
            errors.insert(Field::Price, err);
            None
        }
    };
    let stock = match parse_in_range(&form.stock, STOCK_RANGE) {
        Ok(stock) => Some(stock),
        Err(err) => {
            errors.insert(Field::Stock, err);
            None
        }
    };

    if let Err(err) = check_images(&form.images, mode) {
        errors.insert(Field::Images, err);
    }

    match (price, stock) {
        (Some(price), Some(stock)) if errors.is_empty() => Ok(ValidGift {
            name: name.to_string(),
            price,
            stock,
            images: form.images.clone(),
        }),
        _ => Err(errors),
    }
}

fn parse_in_range(raw: &str, (min, max): (i64, i64)) -> Result<i64, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::Required);
    }
    let value: i64 = raw.parse().map_err(|_| FieldError::NotAnInteger)?;
    if !(min..=max).contains(&value) {
        return Err(FieldError::OutOfRange { min, max });
    }
    Ok(value)
}

fn check_images(images: &[ImageFile], mode: FormMode) -> Result<(), FieldError> {
    let existing = match mode {
        FormMode::Create => {
            if images.is_empty() {
                return Err(FieldError::MissingImage);
            }
            0
        }
        FormMode::Edit { existing_photos } => existing_photos,
    };

    if let Some(bad) = images
        .iter()
        .find(|image| !ALLOWED_IMAGE_TYPES.contains(&image.mime.as_str()))
    {
        return Err(FieldError::UnsupportedImage(bad.file_name()));
    }

    if existing + images.len() > MAX_IMAGES {
        return Err(FieldError::TooManyImages);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str, stock: &str) -> GiftForm {
        GiftForm {
            name: "Tazza".to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
            images: vec![ImageFile::from_path("tazza.jpg")],
        }
    }

    #[test]
    fn accepts_boundary_values() {
        for (price, stock) in [("1", "1"), ("9999", "999"), ("1", "999"), ("9999", "1")] {
            let valid = validate_gift_form(&form(price, stock), FormMode::Create).unwrap();
            assert_eq!(valid.price.to_string(), price);
            assert_eq!(valid.stock.to_string(), stock);
        }
    }

    #[test]
    fn rejects_price_outside_range() {
        for price in ["0", "10000", "-5"] {
            let errors = validate_gift_form(&form(price, "5"), FormMode::Create).unwrap_err();
            assert_eq!(
                errors.get(&Field::Price),
                Some(&FieldError::OutOfRange { min: 1, max: 9999 })
            );
            assert!(!errors.contains_key(&Field::Stock));
        }
    }

    #[test]
    fn rejects_stock_outside_range() {
        for stock in ["0", "1000"] {
            let errors = validate_gift_form(&form("10", stock), FormMode::Create).unwrap_err();
            assert_eq!(
                errors.get(&Field::Stock),
                Some(&FieldError::OutOfRange { min: 1, max: 999 })
            );
        }
    }

    #[test]
    fn rejects_non_integer_numbers() {
        let errors = validate_gift_form(&form("12.5", "abc"), FormMode::Create).unwrap_err();
        assert_eq!(errors.get(&Field::Price), Some(&FieldError::NotAnInteger));
        assert_eq!(errors.get(&Field::Stock), Some(&FieldError::NotAnInteger));
    }

    #[test]
    fn collects_every_failing_field() {
        let empty = GiftForm::default();
        let errors = validate_gift_form(&empty, FormMode::Create).unwrap_err();
        assert_eq!(errors.get(&Field::Name), Some(&FieldError::Required));
        assert_eq!(errors.get(&Field::Price), Some(&FieldError::Required));
        assert_eq!(errors.get(&Field::Stock), Some(&FieldError::Required));
        assert_eq!(errors.get(&Field::Images), Some(&FieldError::MissingImage));
    }

    #[test]
    fn creation_requires_supported_images() {
        let mut gift = form("10", "5");
        gift.images.push(ImageFile::from_path("scan.gif"));
        let errors = validate_gift_form(&gift, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.get(&Field::Images),
            Some(&FieldError::UnsupportedImage("scan.gif".to_string()))
        );
    }

    #[test]
    fn image_count_is_capped() {
        let mut gift = form("10", "5");
        gift.images = (0..8)
            .map(|i| ImageFile::from_path(format!("{i}.png")))
            .collect();
        assert!(validate_gift_form(&gift, FormMode::Create).is_ok());

        gift.images.push(ImageFile::from_path("extra.webp"));
        let errors = validate_gift_form(&gift, FormMode::Create).unwrap_err();
        assert_eq!(errors.get(&Field::Images), Some(&FieldError::TooManyImages));
    }

    #[test]
    fn edit_counts_existing_photos_and_allows_none_new() {
        let mut gift = form("10", "5");
        gift.images.clear();
        assert!(validate_gift_form(&gift, FormMode::Edit { existing_photos: 3 }).is_ok());

        gift.images = vec![
            ImageFile::from_path("a.png"),
            ImageFile::from_path("b.png"),
        ];
        let errors =
            validate_gift_form(&gift, FormMode::Edit { existing_photos: 7 }).unwrap_err();
        assert_eq!(errors.get(&Field::Images), Some(&FieldError::TooManyImages));
    }

    #[test]
    fn valid_form_trims_name_into_payload() {
        let mut gift = form("15", "2");
        gift.name = "  Sciarpa  ".to_string();
        let payload = validate_gift_form(&gift, FormMode::Create).unwrap().payload();
        assert_eq!(payload.name, "Sciarpa");
        assert_eq!(payload.price, 15);
    }

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(ImageFile::from_path("A.JPEG").mime, "image/jpeg");
        assert_eq!(ImageFile::from_path("a.webp").mime, "image/webp");
        assert_eq!(ImageFile::from_path("noext").mime, "application/octet-stream");
    }
}
