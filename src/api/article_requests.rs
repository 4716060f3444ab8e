use crate::data_formats::{article_detail_query, ArticlePayload, ArticleQuery, CollectionWrapper, DataWrapper};
use crate::errors::ApiResult;
use crate::http_client::ApiClient;
use crate::models::Article;

const ARTICLES_PATH: &str = "/articles";

fn article_path(document_id: &str) -> String {
    format!("{}/{}", ARTICLES_PATH, document_id)
}

pub async fn list_articles(
    client: &ApiClient,
    query: &ArticleQuery,
) -> ApiResult<CollectionWrapper<Article>> {
    client.get_json(ARTICLES_PATH, &query.to_query_pairs()).await
}

/// Fetches one article with its category and each comment's author.
pub async fn get_article(client: &ApiClient, document_id: &str) -> ApiResult<Article> {
    let DataWrapper { data }: DataWrapper<Article> = client
        .get_json(&article_path(document_id), &article_detail_query())
        .await?;
    Ok(data)
}

pub async fn create_article(client: &ApiClient, payload: &ArticlePayload) -> ApiResult<Article> {
    let DataWrapper { data }: DataWrapper<Article> = client
        .post_json(ARTICLES_PATH, &DataWrapper::wrap(payload))
        .await?;
    Ok(data)
}

pub async fn update_article(
    client: &ApiClient,
    document_id: &str,
    payload: &ArticlePayload,
) -> ApiResult<Article> {
    let DataWrapper { data }: DataWrapper<Article> = client
        .put_json(&article_path(document_id), &DataWrapper::wrap(payload))
        .await?;
    Ok(data)
}

pub async fn delete_article(client: &ApiClient, document_id: &str) -> ApiResult<()> {
    client.delete(&article_path(document_id)).await
}
