use engine::{
    validation::{
        Field, FieldError, FieldErrors, FormMode, GiftForm, ImageFile, ValidGift,
        validate_gift_form,
    },
    views::GiftRow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Price,
    Stock,
    Images,
}

impl FormField {
    pub const ALL: [FormField; 4] = [Self::Name, Self::Price, Self::Stock, Self::Images];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome",
            Self::Price => "Prezzo (€)",
            Self::Stock => "Disponibilità",
            Self::Images => "Immagini",
        }
    }

    fn validation_field(self) -> Field {
        match self {
            Self::Name => Field::Name,
            Self::Price => Field::Price,
            Self::Stock => Field::Stock,
            Self::Images => Field::Images,
        }
    }
}

/// Gift being created or edited. Images are typed as a comma separated list
/// of file paths.
#[derive(Debug, Clone)]
pub struct GiftFormState {
    pub present_id: Option<i64>,
    pub existing_photos: usize,
    pub name: String,
    pub price: String,
    pub stock: String,
    pub images: String,
    pub focus: FormField,
    pub errors: FieldErrors,
    pub saving: bool,
    pub message: Option<String>,
}

impl GiftFormState {
    pub fn create() -> Self {
        Self {
            present_id: None,
            existing_photos: 0,
            name: String::new(),
            price: String::new(),
            stock: String::new(),
            images: String::new(),
            focus: FormField::Name,
            errors: FieldErrors::new(),
            saving: false,
            message: None,
        }
    }

    pub fn edit(row: &GiftRow) -> Self {
        Self {
            present_id: Some(row.id),
            existing_photos: row.photos.len(),
            name: row.name.clone(),
            price: row.price.to_string(),
            stock: row.stock.to_string(),
            ..Self::create()
        }
    }

    pub fn title(&self) -> String {
        match self.present_id {
            Some(id) => format!(" modifica regalo #{id} "),
            None => " nuovo regalo ".to_string(),
        }
    }

    pub fn mode(&self) -> FormMode {
        match self.present_id {
            Some(_) => FormMode::Edit {
                existing_photos: self.existing_photos,
            },
            None => FormMode::Create,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Price,
            FormField::Price => FormField::Stock,
            FormField::Stock => FormField::Images,
            FormField::Images => FormField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Images,
            FormField::Price => FormField::Name,
            FormField::Stock => FormField::Price,
            FormField::Images => FormField::Stock,
        };
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Price => &self.price,
            FormField::Stock => &self.stock,
            FormField::Images => &self.images,
        }
    }

    pub fn active_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Price => &mut self.price,
            FormField::Stock => &mut self.stock,
            FormField::Images => &mut self.images,
        }
    }

    pub fn error(&self, field: FormField) -> Option<&FieldError> {
        self.errors.get(&field.validation_field())
    }

    /// Records a gift the backend already stored, with the first `uploaded`
    /// images sent. Submitting again updates it instead of creating another.
    pub fn mark_saved(&mut self, present_id: i64, uploaded: usize) {
        self.present_id = Some(present_id);
        self.existing_photos += uploaded;
        let remaining = self
            .image_paths()
            .skip(uploaded)
            .collect::<Vec<_>>()
            .join(", ");
        self.images = remaining;
    }

    fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.images
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    fn to_form(&self) -> GiftForm {
        GiftForm {
            name: self.name.clone(),
            price: self.price.clone(),
            stock: self.stock.clone(),
            images: self.image_paths().map(ImageFile::from_path).collect(),
        }
    }

    /// Validates the form; on failure the field errors are kept for display
    /// and focus moves to the first failing field.
    pub fn submit(&mut self) -> Option<ValidGift> {
        match validate_gift_form(&self.to_form(), self.mode()) {
            Ok(valid) => {
                self.errors.clear();
                self.message = None;
                Some(valid)
            }
            Err(errors) => {
                if let Some(first) = FormField::ALL
                    .into_iter()
                    .find(|field| errors.contains_key(&field.validation_field()))
                {
                    self.focus = first;
                }
                self.errors = errors;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_reports_field_errors_and_focuses_first() {
        let mut form = GiftFormState::create();
        form.name = "Tazza".to_string();
        form.price = "0".to_string();
        form.stock = "5".to_string();
        form.images = "tazza.png".to_string();
        form.focus = FormField::Images;

        assert!(form.submit().is_none());
        assert_eq!(form.focus, FormField::Price);
        assert!(form.error(FormField::Price).is_some());
        assert!(form.error(FormField::Name).is_none());
    }

    #[test]
    fn images_are_split_on_commas() {
        let mut form = GiftFormState::create();
        form.name = "Tazza".to_string();
        form.price = "12".to_string();
        form.stock = "3".to_string();
        form.images = " a.png, b.jpg ,, ".to_string();

        let valid = form.submit().unwrap();
        assert_eq!(valid.images.len(), 2);
        assert_eq!(valid.images[1].mime, "image/jpeg");
        assert!(form.errors.is_empty());
    }

    #[test]
    fn edit_prefills_and_counts_existing_photos() {
        let row = GiftRow {
            id: 4,
            name: "Sciarpa".to_string(),
            price: 40,
            stock: 9,
            photos: vec![1, 2, 3],
        };
        let mut form = GiftFormState::edit(&row);
        assert_eq!(form.mode(), FormMode::Edit { existing_photos: 3 });
        assert_eq!(form.price, "40");
        assert!(form.submit().is_some());
    }

    #[test]
    fn field_cycle_wraps_both_ways() {
        let mut form = GiftFormState::create();
        form.prev_field();
        assert_eq!(form.focus, FormField::Images);
        form.next_field();
        assert_eq!(form.focus, FormField::Name);
    }

    #[test]
    fn mark_saved_switches_to_edit_with_remaining_images() {
        let mut form = GiftFormState::create();
        form.images = "a.png, b.png, c.webp".to_string();

        form.mark_saved(9, 2);
        assert_eq!(form.mode(), FormMode::Edit { existing_photos: 2 });
        assert_eq!(form.images, "c.webp");
        assert_eq!(form.title(), " modifica regalo #9 ");
    }
}
