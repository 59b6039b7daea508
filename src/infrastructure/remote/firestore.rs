use super::classify_response;
use crate::application::ports::{RecipeStore, TokenProvider, UserProfileStore};
use crate::domain::entities::{
    Difficulty, Ingredient, NewRecipe, Recipe, RecipePatch, UserProfile,
};
use crate::shared::config::FirebaseConfig;
use crate::shared::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

const RECIPES_COLLECTION: &str = "recipes";
const USERS_COLLECTION: &str = "users";

/// Thin Firestore REST v1 client scoped to one project's `(default)`
/// database. Requests carry the signed-in user's ID token, so the backend's
/// security rules apply per user.
#[derive(Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl FirestoreClient {
    pub fn new(config: &FirebaseConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| AppError::Configuration(err.to_string()))?;
        Ok(Self {
            http,
            documents_url: format!(
                "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            tokens,
        })
    }

    /// Points the client somewhere else, e.g. at an emulator.
    pub fn with_documents_url(mut self, url: impl Into<String>) -> Self {
        self.documents_url = url.into();
        self
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens
            .id_token()
            .await
            .ok_or_else(|| AppError::Unauthorized("no signed-in user".to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let token = self.bearer().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }
        let code = body
            .pointer("/error/status")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("remote store request failed")
            .to_string();
        Err(classify_response(status, &code, message))
    }
}

/// `recipes` collection access.
pub struct FirestoreRecipeStore {
    client: FirestoreClient,
}

impl FirestoreRecipeStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecipeStore for FirestoreRecipeStore {
    async fn create(&self, recipe: &NewRecipe) -> Result<String> {
        let body = encode_new_recipe(recipe, &Utc::now());
        let url = format!("{}/{}", self.client.documents_url, RECIPES_COLLECTION);
        let doc = self.client.send(self.client.http.post(url).json(&body)).await?;

        document_id(&doc)
            .ok_or_else(|| AppError::Internal("create response carried no document name".into()))
    }

    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Recipe>> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": RECIPES_COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "authorId" },
                        "op": "EQUAL",
                        "value": { "stringValue": author_id },
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": "createdAt" },
                    "direction": "DESCENDING",
                }],
            }
        });
        let url = format!("{}:runQuery", self.client.documents_url);
        let body = self.client.send(self.client.http.post(url).json(&query)).await?;
        Ok(collect_query_documents(&body))
    }

    async fn update(&self, id: &str, patch: &RecipePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let (body, mut params) = encode_patch(patch, &Utc::now());
        // Refuse to resurrect a deleted record through a patch.
        params.push(("currentDocument.exists", "true".to_string()));
        let url = format!(
            "{}/{}/{}",
            self.client.documents_url, RECIPES_COLLECTION, id
        );
        self.client
            .send(self.client.http.patch(url).query(&params).json(&body))
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = format!(
            "{}/{}/{}",
            self.client.documents_url, RECIPES_COLLECTION, id
        );
        self.client
            .send(self.client.http.delete(url))
            .await
            .map(|_| ())
    }
}

/// `users/{uid}` document access. Profiles travel as their JSON form mapped
/// field-by-field onto Firestore values.
pub struct FirestoreUserStore {
    client: FirestoreClient,
}

impl FirestoreUserStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserProfileStore for FirestoreUserStore {
    async fn get(&self, uid: &str) -> Result<Option<UserProfile>> {
        let url = format!("{}/{}/{}", self.client.documents_url, USERS_COLLECTION, uid);
        let doc = match self.client.send(self.client.http.get(url)).await {
            Ok(doc) => doc,
            Err(AppError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let fields = doc.get("fields").cloned().unwrap_or_else(|| json!({}));
        let profile = serde_json::from_value(firestore_fields_to_json(&fields))?;
        Ok(Some(profile))
    }

    async fn put(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_value(profile)?;
        let body = json!({ "fields": json_to_firestore_fields(&json) });
        // A patch without a field mask replaces the whole document and
        // creates it when absent.
        let url = format!(
            "{}/{}/{}",
            self.client.documents_url, USERS_COLLECTION, profile.id
        );
        self.client
            .send(self.client.http.patch(url).json(&body))
            .await
            .map(|_| ())
    }

    async fn touch_last_login(&self, uid: &str, at: DateTime<Utc>) -> Result<()> {
        let body = json!({
            "fields": { "lastLoginAt": string_value(&at.to_rfc3339_opts(SecondsFormat::Micros, true)) }
        });
        let url = format!("{}/{}/{}", self.client.documents_url, USERS_COLLECTION, uid);
        self.client
            .send(
                self.client
                    .http
                    .patch(url)
                    .query(&[("updateMask.fieldPaths", "lastLoginAt")])
                    .json(&body),
            )
            .await
            .map(|_| ())
    }
}

// --- document encoding -------------------------------------------------

fn encode_new_recipe(recipe: &NewRecipe, created_at: &DateTime<Utc>) -> Value {
    let mut fields = Map::new();
    fields.insert("name".into(), string_value(&recipe.name));
    fields.insert(
        "totalTime".into(),
        integer_value(recipe.total_time_minutes as i64),
    );
    fields.insert("servings".into(), integer_value(recipe.servings as i64));
    fields.insert(
        "difficulty".into(),
        string_value(recipe.difficulty.as_str()),
    );
    fields.insert(
        "ingredientLines".into(),
        array_value(recipe.ingredients.iter().map(encode_ingredient).collect()),
    );
    fields.insert("instructions".into(), string_value(&recipe.instructions));
    fields.insert("authorId".into(), string_value(&recipe.author_id));
    fields.insert("authorName".into(), string_value(&recipe.author_name));
    fields.insert("createdAt".into(), timestamp_value(created_at));
    if let Some(category) = &recipe.category {
        fields.insert("category".into(), string_value(category));
    }
    json!({ "fields": fields })
}

fn encode_ingredient(ingredient: &Ingredient) -> Value {
    json!({
        "mapValue": {
            "fields": {
                "name": string_value(&ingredient.name),
                "quantity": double_value(ingredient.quantity),
                "unit": string_value(&ingredient.unit),
            }
        }
    })
}

fn encode_patch(patch: &RecipePatch, now: &DateTime<Utc>) -> (Value, Vec<(&'static str, String)>) {
    let mut fields = Map::new();
    let mut params = Vec::new();
    if let Some(name) = &patch.name {
        fields.insert("name".into(), string_value(name));
        params.push(("updateMask.fieldPaths", "name".to_string()));
    }
    if let Some(photo_url) = &patch.photo_url {
        fields.insert("photoUrl".into(), string_value(photo_url));
        params.push(("updateMask.fieldPaths", "photoUrl".to_string()));
    }
    fields.insert("updatedAt".into(), timestamp_value(now));
    params.push(("updateMask.fieldPaths", "updatedAt".to_string()));
    (json!({ "fields": fields }), params)
}

/// Last path segment of the document resource name.
fn document_id(doc: &Value) -> Option<String> {
    doc.get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// `runQuery` responses interleave documents with bare read timestamps;
/// only the documents matter.
fn collect_query_documents(body: &Value) -> Vec<Recipe> {
    body.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("document"))
                .map(decode_recipe)
                .collect()
        })
        .unwrap_or_default()
}

/// Lenient decode: missing or oddly typed fields degrade to defaults rather
/// than failing the whole listing.
fn decode_recipe(doc: &Value) -> Recipe {
    let id = document_id(doc).unwrap_or_default();
    let fields = doc.get("fields").cloned().unwrap_or(Value::Null);

    Recipe {
        id,
        name: string_field(&fields, "name").unwrap_or_default(),
        total_time_minutes: integer_field(&fields, "totalTime").unwrap_or(0).max(0) as u32,
        servings: integer_field(&fields, "servings").unwrap_or(0).max(0) as u32,
        difficulty: string_field(&fields, "difficulty")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Difficulty::Easy),
        ingredients: array_field(&fields, "ingredientLines")
            .map(|values| values.iter().filter_map(decode_ingredient).collect())
            .unwrap_or_default(),
        instructions: string_field(&fields, "instructions").unwrap_or_default(),
        photo_url: string_field(&fields, "photoUrl"),
        author_id: string_field(&fields, "authorId").unwrap_or_default(),
        author_name: string_field(&fields, "authorName").unwrap_or_default(),
        created_at: timestamp_field(&fields, "createdAt").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        category: string_field(&fields, "category"),
    }
}

fn decode_ingredient(value: &Value) -> Option<Ingredient> {
    let fields = value.get("mapValue")?.get("fields")?;
    Some(Ingredient {
        name: string_field(fields, "name")?,
        quantity: double_field(fields, "quantity")?,
        unit: string_field(fields, "unit").unwrap_or_default(),
    })
}

// --- Firestore value helpers -------------------------------------------

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn integer_value(i: i64) -> Value {
    // Firestore integers travel as decimal strings.
    json!({ "integerValue": i.to_string() })
}

fn double_value(f: f64) -> Value {
    json!({ "doubleValue": f })
}

fn bool_value(b: bool) -> Value {
    json!({ "booleanValue": b })
}

fn timestamp_value(t: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

fn array_value(values: Vec<Value>) -> Value {
    json!({ "arrayValue": { "values": values } })
}

fn string_field(fields: &Value, name: &str) -> Option<String> {
    fields
        .get(name)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn integer_field(fields: &Value, name: &str) -> Option<i64> {
    let value = fields.get(name)?;
    if let Some(raw) = value.get("integerValue") {
        if let Some(s) = raw.as_str() {
            return s.parse().ok();
        }
        if let Some(i) = raw.as_i64() {
            return Some(i);
        }
    }
    value.get("doubleValue")?.as_f64().map(|f| f as i64)
}

fn double_field(fields: &Value, name: &str) -> Option<f64> {
    let value = fields.get(name)?;
    if let Some(d) = value.get("doubleValue").and_then(Value::as_f64) {
        return Some(d);
    }
    if let Some(raw) = value.get("integerValue") {
        if let Some(s) = raw.as_str() {
            return s.parse().ok();
        }
        return raw.as_f64();
    }
    None
}

fn timestamp_field(fields: &Value, name: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(name)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn array_field<'a>(fields: &'a Value, name: &str) -> Option<&'a Vec<Value>> {
    fields
        .get(name)?
        .get("arrayValue")?
        .get("values")?
        .as_array()
}

// --- generic JSON <-> Firestore mapping (user profiles) ----------------

fn json_to_firestore_fields(value: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(object) = value.as_object() {
        for (key, entry) in object {
            fields.insert(key.clone(), json_to_firestore_value(entry));
        }
    }
    fields
}

fn json_to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => bool_value(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                integer_value(i)
            } else {
                double_value(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => string_value(s),
        Value::Array(items) => {
            array_value(items.iter().map(json_to_firestore_value).collect())
        }
        Value::Object(_) => {
            json!({ "mapValue": { "fields": json_to_firestore_fields(value) } })
        }
    }
}

fn firestore_fields_to_json(fields: &Value) -> Value {
    let mut object = Map::new();
    if let Some(entries) = fields.as_object() {
        for (key, entry) in entries {
            object.insert(key.clone(), firestore_value_to_json(entry));
        }
    }
    Value::Object(object)
}

fn firestore_value_to_json(value: &Value) -> Value {
    if let Some(s) = value.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(raw) = value.get("integerValue") {
        if let Some(i) = raw.as_str().and_then(|s| s.parse::<i64>().ok()) {
            return json!(i);
        }
        if let Some(i) = raw.as_i64() {
            return json!(i);
        }
    }
    if let Some(d) = value.get("doubleValue").and_then(Value::as_f64) {
        return json!(d);
    }
    if let Some(b) = value.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if let Some(t) = value.get("timestampValue").and_then(Value::as_str) {
        return Value::String(t.to_string());
    }
    if let Some(values) = value
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(values.iter().map(firestore_value_to_json).collect());
    }
    if let Some(fields) = value.get("mapValue").and_then(|m| m.get("fields")) {
        return firestore_fields_to_json(fields);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_new_recipe() -> NewRecipe {
        NewRecipe {
            name: "Carbonara".into(),
            total_time_minutes: 30,
            servings: 4,
            difficulty: Difficulty::Medium,
            ingredients: vec![Ingredient {
                name: "spaghetti".into(),
                quantity: 320.0,
                unit: "g".into(),
            }],
            instructions: "Boil pasta.".into(),
            author_id: "user-1".into(),
            author_name: "Anna Rossi".into(),
            category: Some("pasta".into()),
        }
    }

    #[test]
    fn new_recipes_encode_into_the_document_shape() {
        let created_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let body = encode_new_recipe(&sample_new_recipe(), &created_at);
        let fields = body.get("fields").expect("fields");

        assert_eq!(
            fields.pointer("/name/stringValue").and_then(Value::as_str),
            Some("Carbonara")
        );
        // Integers travel as strings.
        assert_eq!(
            fields
                .pointer("/totalTime/integerValue")
                .and_then(Value::as_str),
            Some("30")
        );
        assert_eq!(
            fields
                .pointer("/difficulty/stringValue")
                .and_then(Value::as_str),
            Some("medium")
        );
        assert_eq!(
            fields
                .pointer("/ingredientLines/arrayValue/values/0/mapValue/fields/quantity/doubleValue")
                .and_then(Value::as_f64),
            Some(320.0)
        );
        assert!(fields.pointer("/createdAt/timestampValue").is_some());
        assert!(fields.get("photoUrl").is_none(), "no photo at creation");
    }

    #[test]
    fn recipes_decode_leniently_from_documents() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/recipes/rec-42",
            "fields": {
                "name": { "stringValue": "Risotto" },
                "totalTime": { "integerValue": "45" },
                "servings": { "integerValue": "2" },
                "difficulty": { "stringValue": "hard" },
                "ingredientLines": { "arrayValue": { "values": [
                    { "mapValue": { "fields": {
                        "name": { "stringValue": "rice" },
                        "quantity": { "doubleValue": 160.0 },
                        "unit": { "stringValue": "g" }
                    }}}
                ]}},
                "instructions": { "stringValue": "Stir." },
                "authorId": { "stringValue": "user-1" },
                "authorName": { "stringValue": "Anna" },
                "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" }
            }
        });

        let recipe = decode_recipe(&doc);
        assert_eq!(recipe.id, "rec-42");
        assert_eq!(recipe.total_time_minutes, 45);
        assert_eq!(recipe.difficulty, Difficulty::Hard);
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.photo_url, None, "absent optional field tolerated");
        assert_eq!(recipe.category, None);
        assert_eq!(
            recipe.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn query_results_skip_read_time_only_entries() {
        let body = json!([
            { "readTime": "2024-05-01T10:00:00Z" },
            {
                "readTime": "2024-05-01T10:00:00Z",
                "document": {
                    "name": "projects/p/databases/(default)/documents/recipes/rec-1",
                    "fields": { "name": { "stringValue": "Focaccia" } }
                }
            }
        ]);

        let recipes = collect_query_documents(&body);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Focaccia");
    }

    #[test]
    fn an_empty_query_response_is_a_valid_empty_state() {
        assert!(collect_query_documents(&json!([])).is_empty());
        assert!(
            collect_query_documents(&json!([{ "readTime": "2024-05-01T10:00:00Z" }])).is_empty()
        );
    }

    #[test]
    fn patch_masks_exactly_the_touched_fields() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (body, params) = encode_patch(&RecipePatch::with_photo_url("https://x/p.jpg"), &now);

        let masked: Vec<&str> = params
            .iter()
            .filter(|(key, _)| *key == "updateMask.fieldPaths")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(masked, vec!["photoUrl", "updatedAt"]);
        assert_eq!(
            body.pointer("/fields/photoUrl/stringValue")
                .and_then(Value::as_str),
            Some("https://x/p.jpg")
        );
        assert!(body.pointer("/fields/name").is_none());
    }

    #[test]
    fn user_profiles_round_trip_through_firestore_values() {
        let profile = UserProfile::new_registered("u1", "anna@example.com", "Anna", "Rossi");
        let json = serde_json::to_value(&profile).expect("to json");
        let fields = json_to_firestore_fields(&json);
        let back = firestore_fields_to_json(&Value::Object(fields));
        let decoded: UserProfile = serde_json::from_value(back).expect("from json");

        assert_eq!(decoded.id, profile.id);
        assert_eq!(decoded.display_name, profile.display_name);
        assert_eq!(decoded.household_size, profile.household_size);
        assert_eq!(decoded.created_at, profile.created_at);
    }
}
