// src/common/i18n.rs

// Catálogo de mensagens da API. Colunas: en, pt, es.
// A chave também é usada como `message` nos atributos do validator.
const MESSAGES: &[(&str, [&str; 3])] = &[
    ("validation_failed", [
        "One or more fields are invalid.",
        "Um ou mais campos são inválidos.",
        "Uno o más campos no son válidos.",
    ]),
    ("required", [
        "This field is required.",
        "Este campo é obrigatório.",
        "Este campo es obligatorio.",
    ]),
    ("invalid_username", [
        "Username must be between 3 and 150 characters.",
        "O nome de usuário deve ter entre 3 e 150 caracteres.",
        "El nombre de usuario debe tener entre 3 y 150 caracteres.",
    ]),
    ("password_too_short", [
        "Password must be at least 6 characters long.",
        "A senha deve ter no mínimo 6 caracteres.",
        "La contraseña debe tener al menos 6 caracteres.",
    ]),
    ("invalid_email", [
        "Enter a valid email address.",
        "O e-mail fornecido é inválido.",
        "Introduzca un correo electrónico válido.",
    ]),
    ("invalid_barcode", [
        "Barcode must be between 1 and 100 characters.",
        "O código de barras deve ter entre 1 e 100 caracteres.",
        "El código de barras debe tener entre 1 y 100 caracteres.",
    ]),
    ("too_long", [
        "This value is too long.",
        "Este valor é longo demais.",
        "Este valor es demasiado largo.",
    ]),
    ("must_not_be_negative", [
        "This value cannot be negative.",
        "O valor não pode ser negativo.",
        "El valor no puede ser negativo.",
    ]),
    ("amount_too_large", [
        "Ensure this value is at most 9999999999.99.",
        "O valor deve ser no máximo 9999999999.99.",
        "El valor debe ser como máximo 9999999999.99.",
    ]),
    ("must_be_positive", [
        "This value must be greater than zero.",
        "O valor deve ser maior que zero.",
        "El valor debe ser mayor que cero.",
    ]),
    ("at_least_one_item", [
        "A sale needs at least one item.",
        "A venda precisa de pelo menos um item.",
        "La venta necesita al menos un artículo.",
    ]),
    ("invalid_initial_status", [
        "A sale cannot be created as cancelled.",
        "Uma venda não pode ser criada já cancelada.",
        "Una venta no puede crearse como cancelada.",
    ]),
    ("username_exists", [
        "Username already exists.",
        "Este nome de usuário já está em uso.",
        "El nombre de usuario ya existe.",
    ]),
    ("unknown_reference", [
        "The referenced record does not exist.",
        "O registro referenciado não existe.",
        "El registro referenciado no existe.",
    ]),
    ("insufficient_stock", [
        "Insufficient stock (available: {available}, requested: {requested}).",
        "Estoque insuficiente (disponível: {available}, solicitado: {requested}).",
        "Stock insuficiente (disponible: {available}, solicitado: {requested}).",
    ]),
    ("total_mismatch", [
        "Total does not match the sum of the items ({expected}).",
        "O total não confere com a soma dos itens ({expected}).",
        "El total no coincide con la suma de los artículos ({expected}).",
    ]),
    ("insufficient_payment", [
        "Paid amount is lower than the sale total ({total}).",
        "O valor pago é menor que o total da venda ({total}).",
        "El monto pagado es menor que el total de la venta ({total}).",
    ]),
    ("invalid_status_transition", [
        "Cannot change sale status from {from} to {to}.",
        "Não é possível mudar o status da venda de {from} para {to}.",
        "No se puede cambiar el estado de la venta de {from} a {to}.",
    ]),
    ("unique_violation", [
        "A record with this value already exists.",
        "Já existe um registro com este valor.",
        "Ya existe un registro con este valor.",
    ]),
    ("foreign_key_violation", [
        "This record is referenced by other records.",
        "Este registro está em uso por outros registros.",
        "Este registro está referenciado por otros registros.",
    ]),
    ("bad_request", [
        "Invalid request.",
        "Requisição inválida.",
        "Solicitud no válida.",
    ]),
    ("not_found", [
        "Resource not found.",
        "Recurso não encontrado.",
        "Recurso no encontrado.",
    ]),
    ("invalid_credentials", [
        "Invalid username or password.",
        "Usuário ou senha inválidos.",
        "Usuario o contraseña no válidos.",
    ]),
    ("invalid_token", [
        "Authentication token is invalid or missing.",
        "Token de autenticação inválido ou ausente.",
        "El token de autenticación no es válido o falta.",
    ]),
    ("internal_error", [
        "An unexpected error occurred.",
        "Ocorreu um erro inesperado.",
        "Ocurrió un error inesperado.",
    ]),
];

pub const SUPPORTED_LANGUAGES: [&str; 3] = ["en", "pt", "es"];

fn column(lang: &str) -> usize {
    SUPPORTED_LANGUAGES
        .iter()
        .position(|l| *l == lang)
        .unwrap_or(0)
}

/// Traduz uma chave do catálogo. Chaves desconhecidas voltam como estão
/// (ex: códigos padrão do validator como "range").
pub fn translate(lang: &str, key: &str) -> String {
    MESSAGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, texts)| texts[column(lang)].to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Igual a `translate`, substituindo `{nome}` pelos valores dados.
pub fn translate_with(lang: &str, key: &str, args: &[(&str, String)]) -> String {
    args.iter().fold(translate(lang, key), |msg, (name, value)| {
        msg.replace(&format!("{{{name}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english() {
        assert_eq!(translate("de", "not_found"), "Resource not found.");
        assert_eq!(translate("pt", "not_found"), "Recurso não encontrado.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(translate("en", "range"), "range");
    }

    #[test]
    fn placeholders_are_filled() {
        let msg = translate_with(
            "en",
            "insufficient_stock",
            &[("available", "3".into()), ("requested", "5".into())],
        );
        assert_eq!(msg, "Insufficient stock (available: 3, requested: 5).");
    }

    #[test]
    fn every_message_has_all_languages() {
        for (key, texts) in MESSAGES {
            assert!(texts.iter().all(|t| !t.is_empty()), "missing text for {key}");
        }
    }
}
