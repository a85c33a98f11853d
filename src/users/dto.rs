use serde::Deserialize;

/// Raw form body shared by the create and edit forms. Absent fields arrive empty.
#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields (name, email, password) are required.")]
    MissingCreateFields,
    #[error("Name and email are required.")]
    MissingEditFields,
}

/// Validated input of the create form.
#[derive(Debug, PartialEq, Eq)]
pub struct NewUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUserInput {
    pub fn parse(form: UserForm) -> Result<Self, ValidationError> {
        let name = form.name.trim().to_string();
        let email = normalize_email(&form.email);
        if name.is_empty() || email.is_empty() || form.password.is_empty() {
            return Err(ValidationError::MissingCreateFields);
        }
        Ok(Self {
            name,
            email,
            password: form.password,
        })
    }
}

/// Validated input of the edit form. `password` is `None` when left blank.
#[derive(Debug, PartialEq, Eq)]
pub struct UserUpdateInput {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

impl UserUpdateInput {
    pub fn parse(form: UserForm) -> Result<Self, ValidationError> {
        let name = form.name.trim().to_string();
        let email = normalize_email(&form.email);
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingEditFields);
        }
        let password = Some(form.password).filter(|p| !p.is_empty());
        Ok(Self {
            name,
            email,
            password,
        })
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str) -> UserForm {
        UserForm {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn create_trims_and_lowercases() {
        let input = NewUserInput::parse(form("  Ann  ", " Ann@Example.COM ", " pw ")).unwrap();
        assert_eq!(input.name, "Ann");
        assert_eq!(input.email, "ann@example.com");
        // password is taken verbatim
        assert_eq!(input.password, " pw ");
    }

    #[test]
    fn create_requires_every_field() {
        for f in [
            form("", "a@x.com", "pw"),
            form("   ", "a@x.com", "pw"),
            form("Ann", "  ", "pw"),
            form("Ann", "a@x.com", ""),
            UserForm::default(),
        ] {
            assert_eq!(
                NewUserInput::parse(f),
                Err(ValidationError::MissingCreateFields)
            );
        }
    }

    #[test]
    fn edit_blank_password_means_keep() {
        let input = UserUpdateInput::parse(form("Ann", "A@X.com", "")).unwrap();
        assert_eq!(input.email, "a@x.com");
        assert_eq!(input.password, None);

        let input = UserUpdateInput::parse(form("Ann", "a@x.com", "new")).unwrap();
        assert_eq!(input.password.as_deref(), Some("new"));
    }

    #[test]
    fn edit_requires_name_and_email() {
        assert_eq!(
            UserUpdateInput::parse(form("", "a@x.com", "pw")),
            Err(ValidationError::MissingEditFields)
        );
        assert_eq!(
            UserUpdateInput::parse(form("Ann", "", "pw")),
            Err(ValidationError::MissingEditFields)
        );
    }

    #[test]
    fn validation_messages_match_flash_text() {
        assert_eq!(
            ValidationError::MissingCreateFields.to_string(),
            "All fields (name, email, password) are required."
        );
        assert_eq!(
            ValidationError::MissingEditFields.to_string(),
            "Name and email are required."
        );
    }
}
