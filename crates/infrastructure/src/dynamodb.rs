use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::Client;
use shared::Config;
use tracing::info;

use crate::StoreError;

/// DynamoDB クライアントとテーブル名をまとめたハンドル
///
/// 起動時に一度だけ構築し、リポジトリ経由で全リクエストから共有する。
#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.aws_region {
            loader = loader.region(Region::new(region.clone()));
        }
        // DynamoDB Local 等への接続先上書き
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        info!(
            table = %config.dynamodb_table,
            endpoint = config.dynamodb_endpoint.as_deref().unwrap_or("default"),
            "DynamoDB client initialized"
        );

        Self::from_client(Client::new(&aws_config), &config.dynamodb_table)
    }

    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDK エラーをストアエラーへ変換
    pub fn convert_error<E, R>(&self, error: SdkError<E, R>) -> StoreError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        StoreError::DynamoDb(DisplayErrorContext(error).to_string())
    }
}
