// src/common/validation.rs

use validator::ValidationError;

// Nomes só com espaços passariam no `length(min = 1)` e seriam gravados vazios
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O nome não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
        assert!(validate_not_blank(" Gerente ").is_ok());
    }
}
