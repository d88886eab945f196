//! API documentation endpoints.
//!
//! Serves an OpenAPI 3.0 description of the user resource at
//! [`OPENAPI_PATH`] and a Swagger UI page that loads it from a CDN.

use bytes::Bytes;
use http::StatusCode;
use roster_middleware::{Outcome, Response, ResponseExt};
use serde_json::{json, Value};

/// Path of the OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/swagger/v1/swagger.json";

const SWAGGER_UI_VERSION: &str = "5.18.2";

const HTML: &str = "text/html; charset=utf-8";

/// Builds the OpenAPI document for the five user operations.
#[must_use]
pub fn openapi_document() -> Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });
    let user_body = json!({
        "required": true,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/UserPayload" } }
        }
    });
    let user = json!({
        "application/json": { "schema": { "$ref": "#/components/schemas/User" } }
    });
    let error = |description: &str| {
        json!({
            "description": description,
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } }
            }
        })
    };
    let unauthorized = json!({ "description": "Missing or unknown bearer token" });

    json!({
        "openapi": "3.0.1",
        "info": {
            "title": "Roster User API",
            "version": "v1"
        },
        "paths": {
            "/users": {
                "get": {
                    "operationId": "getUsers",
                    "tags": ["Users"],
                    "responses": {
                        "200": {
                            "description": "All users",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/User" }
                                    }
                                }
                            }
                        },
                        "401": unauthorized
                    }
                },
                "post": {
                    "operationId": "createUser",
                    "tags": ["Users"],
                    "requestBody": user_body,
                    "responses": {
                        "201": { "description": "Created", "content": user },
                        "400": error("Invalid or missing user data"),
                        "401": unauthorized,
                        "409": error("Email already in use")
                    }
                }
            },
            "/users/{id}": {
                "get": {
                    "operationId": "getUser",
                    "tags": ["Users"],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "The user", "content": user },
                        "400": error("Invalid user ID"),
                        "401": unauthorized,
                        "404": error("No such user")
                    }
                },
                "put": {
                    "operationId": "updateUser",
                    "tags": ["Users"],
                    "parameters": [id_param],
                    "requestBody": user_body,
                    "responses": {
                        "204": { "description": "Updated" },
                        "400": error("Invalid user ID or user data"),
                        "401": unauthorized,
                        "404": error("No such user"),
                        "409": error("Email already in use")
                    }
                },
                "delete": {
                    "operationId": "deleteUser",
                    "tags": ["Users"],
                    "parameters": [id_param],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "400": error("Invalid user ID"),
                        "401": unauthorized,
                        "404": error("No such user")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "User": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "name": { "type": "string", "maxLength": 100 },
                        "email": { "type": "string", "format": "email" },
                        "role": { "type": "string", "maxLength": 50 },
                        "createdAt": { "type": "string", "format": "date-time" }
                    }
                },
                "UserPayload": {
                    "type": "object",
                    "required": ["name", "email"],
                    "properties": {
                        "name": { "type": "string", "maxLength": 100 },
                        "email": { "type": "string", "format": "email" },
                        "role": { "type": "string", "maxLength": 50, "default": "User" }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "statusCode": { "type": "integer" },
                        "errors": {
                            "type": "object",
                            "additionalProperties": { "type": "array", "items": { "type": "string" } }
                        }
                    }
                }
            },
            "securitySchemes": {
                "Bearer": { "type": "http", "scheme": "bearer" }
            }
        },
        "security": [{ "Bearer": [] }]
    })
}

/// Builds the Swagger UI page.
#[must_use]
pub fn swagger_ui_html() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Roster User API - Swagger UI</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                url: '{document}',
                dom_id: '#swagger-ui',
                deepLinking: true
            }});
        }};
    </script>
</body>
</html>"##,
        version = SWAGGER_UI_VERSION,
        document = OPENAPI_PATH,
    )
}

/// Documentation responses, built once at startup.
#[derive(Debug, Clone)]
pub struct DocsHandlers {
    document: Value,
    page: Bytes,
}

impl DocsHandlers {
    /// Builds the OpenAPI document and renders the UI page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: openapi_document(),
            page: Bytes::from(swagger_ui_html()),
        }
    }

    /// `GET /swagger/v1/swagger.json`
    pub fn document(&self) -> Outcome {
        Ok(Response::json(StatusCode::OK, &self.document)?)
    }

    /// `GET /swagger`
    #[must_use]
    pub fn swagger_ui(&self) -> Response {
        Response::with_body(StatusCode::OK, HTML, self.page.clone())
    }
}

impl Default for DocsHandlers {
    fn default() -> Self {
        Self::new()
    }
}
