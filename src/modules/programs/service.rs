use tracing::instrument;

use collegium_core::{OperationError, validate};
use collegium_models::{Program, ProgramId};
use collegium_store::{Storage, run_atomic};

use crate::guards::ensure_program_name_free;

pub struct ProgramService;

impl ProgramService {
    /// Creates a program. Names are unique, checked in the same transaction
    /// as the insert.
    #[instrument(skip(storage))]
    pub async fn create_program(
        storage: &dyn Storage,
        name: &str,
    ) -> Result<Program, OperationError> {
        let name = validate::non_empty("name", name)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                ensure_program_name_free(uow, &name, None).await?;
                Ok(uow.insert_program(&name).await?)
            })
        })
        .await
    }

    /// Renames a program, re-checking name uniqueness while excluding the
    /// program's own row.
    #[instrument(skip(storage))]
    pub async fn rename_program(
        storage: &dyn Storage,
        program_id: ProgramId,
        name: &str,
    ) -> Result<Program, OperationError> {
        let name = validate::non_empty("name", name)?;

        run_atomic(storage, move |uow| {
            Box::pin(async move {
                ensure_program_name_free(uow, &name, Some(program_id)).await?;
                if uow.rename_program(program_id, &name).await? == 0 {
                    return Err(OperationError::not_found("program", program_id));
                }
                Ok(Program {
                    id: program_id,
                    name,
                })
            })
        })
        .await
    }

    #[instrument(skip(storage))]
    pub async fn get_program(
        storage: &dyn Storage,
        program_id: ProgramId,
    ) -> Result<Program, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move {
                uow.find_program(program_id)
                    .await?
                    .ok_or_else(|| OperationError::not_found("program", program_id))
            })
        })
        .await
    }

    /// All programs, ordered by name.
    #[instrument(skip(storage))]
    pub async fn list_programs(storage: &dyn Storage) -> Result<Vec<Program>, OperationError> {
        run_atomic(storage, move |uow| {
            Box::pin(async move { Ok(uow.list_programs().await?) })
        })
        .await
    }
}
