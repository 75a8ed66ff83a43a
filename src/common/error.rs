use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A camada HTTP (fora deste core) é quem decide o status code de cada variante.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Registros não encontrados (update/delete com id inexistente) ---
    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Veículo não encontrado")]
    VehicleNotFound,

    #[error("Parcela não encontrada")]
    PaymentNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // --- Violações de chave única ---
    #[error("Já existe um cliente com o CPF {0}")]
    CpfAlreadyExists(String),

    #[error("Já existe um veículo com a placa {0}")]
    PlateAlreadyExists(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("O veículo já possui a parcela de número {0}")]
    InstallmentAlreadyExists(i32),

    // --- Conflitos de ciclo de vida ---
    // Veículo vendido/reservado sem cliente, ou disponível com cliente vinculado.
    #[error("Vínculo de cliente inconsistente com o status do veículo")]
    VehicleClientMismatch,

    // Status PAID exige data de pagamento (e vice-versa).
    #[error("Status da parcela inconsistente com a data de pagamento")]
    PaymentStatusConflict,

    // Vínculo com cliente só é permitido para usuários com papel CLIENT.
    #[error("Apenas usuários com papel CLIENT podem ter vínculo com cliente")]
    RoleClientMismatch,

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}
