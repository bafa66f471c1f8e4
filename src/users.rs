//! The `/users` CRUD endpoints.
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | GET | `/users[?search=]` | | 200, JSON array |
//! | GET | `/users/:id` | | 200, JSON object, or empty body if unknown |
//! | POST | `/users` | `{name, email}` | 201, empty, `location` header |
//! | PUT | `/users/:id` | `{name, email}` | 204 (also for unknown ids) |
//! | DELETE | `/users/:id` | | 204 (also for unknown ids) |
//!
//! A POST or PUT whose body is missing or is not a JSON object of that shape
//! gets `400 Bad Request`.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::handler::Handler;
use crate::health;
use crate::store::{Filter, Record, TableStore};
use crate::{Request, Response, Router, Status};

/// The table every users endpoint works on.
pub const TABLE: &str = "users";

const JSON: &str = "application/json";

/// Builds the full application router around `store`.
pub fn routes(store: Arc<TableStore>) -> Router {
    Router::new()
        .get("/users", with_store(&store, list_users))
        .post("/users", with_store(&store, create_user))
        .get("/users/:id", with_store(&store, get_user))
        .put("/users/:id", with_store(&store, update_user))
        .delete("/users/:id", with_store(&store, delete_user))
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness(store))
}

/// Adapts `f(store, req)` into a plain `Fn(Request)` handler.
fn with_store<F, Fut>(store: &Arc<TableStore>, f: F) -> impl Handler + use<F, Fut>
where
    F: Fn(Arc<TableStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| f(Arc::clone(&store), req)
}

/// `{name, email}` as sent by clients. Both optional; absent fields are
/// simply not stored.
#[derive(Debug, Deserialize)]
struct UserBody {
    name: Option<String>,
    email: Option<String>,
}

impl UserBody {
    fn into_fields(self) -> Record {
        let mut record = Record::new();
        if let Some(name) = self.name {
            record.insert("name".to_owned(), Value::String(name));
        }
        if let Some(email) = self.email {
            record.insert("email".to_owned(), Value::String(email));
        }
        record
    }
}

fn to_json(value: &impl Serialize) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => Response::json(bytes),
        Err(e) => {
            error!(error = %e, "failed to encode response body");
            Response::status(Status::InternalServerError)
        }
    }
}

async fn list_users(store: Arc<TableStore>, req: Request) -> Response {
    let filter = req
        .query("search")
        .filter(|s| !s.is_empty())
        .map(|search| Filter::new().field("name", search).field("email", search));

    let users = store.select(TABLE, filter.as_ref()).many();
    to_json(&users)
}

async fn get_user(store: Arc<TableStore>, req: Request) -> Response {
    let Some(id) = req.param("id") else {
        return Response::status(Status::NotFound);
    };

    match store.select(TABLE, Some(&Filter::by_id(id))).one() {
        Some(user) => to_json(&user),
        None => Response::json(Vec::new()),
    }
}

async fn create_user(store: Arc<TableStore>, req: Request) -> Response {
    let Some(body) = req.json::<UserBody>() else {
        return Response::status(Status::BadRequest);
    };

    let id = Uuid::new_v4().to_string();
    let mut user = Record::new();
    user.insert("id".to_owned(), Value::String(id.clone()));
    user.extend(body.into_fields());
    store.insert(TABLE, user);

    info!(%id, "user created");
    Response::builder()
        .status(Status::Created)
        .header("content-type", JSON)
        .header("location", &format!("/users/{id}"))
        .no_body()
}

async fn update_user(store: Arc<TableStore>, req: Request) -> Response {
    let Some(id) = req.param("id") else {
        return Response::status(Status::NotFound);
    };
    let Some(body) = req.json::<UserBody>() else {
        return Response::status(Status::BadRequest);
    };

    store.update(TABLE, id, body.into_fields());
    Response::status(Status::NoContent)
}

async fn delete_user(store: Arc<TableStore>, req: Request) -> Response {
    if let Some(id) = req.param("id") {
        store.delete(TABLE, id);
    }
    Response::status(Status::NoContent)
}
