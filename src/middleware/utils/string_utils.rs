use surrealdb::sql::Thing;

use crate::middleware::error::AppError;

pub fn get_string_thing(value: String) -> Result<Thing, AppError> {
    Thing::try_from(value.clone()).map_err(|_| AppError::Generic {
        description: format!("error into Thing for value={value}"),
    })
}

pub fn get_str_thing(value: &str) -> Result<Thing, AppError> {
    Thing::try_from(value).map_err(|_| AppError::Generic {
        description: format!("error into Thing for value={value}"),
    })
}
