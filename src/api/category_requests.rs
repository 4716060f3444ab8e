use crate::data_formats::CollectionWrapper;
use crate::errors::ApiResult;
use crate::http_client::ApiClient;
use crate::models::Category;

pub async fn list_categories(client: &ApiClient) -> ApiResult<Vec<Category>> {
    let CollectionWrapper { data, .. }: CollectionWrapper<Category> = client.get_json("/categories", &[]).await?;
    Ok(data)
}
