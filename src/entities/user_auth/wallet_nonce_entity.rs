use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletNonce {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub address: String,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<DateTime<Utc>>,
}

pub struct WalletNonceDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "wallet_nonce";

impl<'a> WalletNonceDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS address ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value);
    DEFINE FIELD IF NOT EXISTS nonce ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS wallet_nonce_address_idx ON TABLE {TABLE_NAME} COLUMNS address UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate wallet_nonce");

        Ok(())
    }

    // a new request replaces any pending nonce for the address
    pub async fn create(&self, address: &str, nonce: &str) -> CtxResult<()> {
        let qry = "
            BEGIN TRANSACTION;
                DELETE FROM wallet_nonce WHERE address = $address;
                CREATE wallet_nonce SET address=$address, nonce=$nonce;
            COMMIT TRANSACTION;
        ";
        let res = self
            .db
            .query(qry)
            .bind(("address", address.to_lowercase()))
            .bind(("nonce", nonce.to_string()))
            .await?;
        res.check().map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn get_by_address(&self, address: &str) -> CtxResult<Option<WalletNonce>> {
        let qry = "SELECT * FROM wallet_nonce WHERE address = $address;";
        let mut res = self
            .db
            .query(qry)
            .bind(("address", address.to_lowercase()))
            .await?;
        let data: Option<WalletNonce> = res.take(0)?;
        Ok(data)
    }

    pub async fn delete(&self, id: Thing) -> CtxResult<()> {
        let _: Option<WalletNonce> = self.db.delete((id.tb, id.id.to_raw())).await?;
        Ok(())
    }
}
