//! Shared fixtures for integration tests.

#![allow(dead_code)]

use prisma_ir::ir::{
    Application, Component, File, ForeignField, GinIndex, Model, PlainField, PlainIndex, Relation,
    ScalarType, UniqueIndex,
};

/// The single-component actors scenario.
pub fn actors_component() -> Component {
    Component::new("schema-01-actors.prisma", "Actors", ["actors_users"])
}

pub fn actors_users() -> Model {
    Model::new("actors_users")
        .with_description("A user of the bulletin board.")
        .with_plain(PlainField::new("name", ScalarType::String).with_description("Display name."))
}

pub fn actors_application() -> Application {
    Application::new(vec![
        File::for_component(&actors_component()).with_model(actors_users()),
    ])
}

/// Two components linked by relations in both directions.
pub fn board_components() -> Vec<Component> {
    vec![
        Component::new("schema-01-actors.prisma", "Actors", ["actors_users"]),
        Component::new(
            "schema-02-articles.prisma",
            "Articles",
            ["bbs_articles", "bbs_article_comments"],
        ),
    ]
}

pub fn board_application() -> Application {
    let components = board_components();

    let users = actors_users()
        .with_plain(PlainField::new("email", ScalarType::String).with_description("Login address."))
        .with_unique_index(UniqueIndex::new(["email"]));

    let articles = Model::new("bbs_articles")
        .with_description("Article of the bulletin board.")
        .with_foreign(
            ForeignField::new(
                "actors_user_id",
                Relation::new("author", "actors_users").with_opposite_name("articles"),
            )
            .with_description("Author's id."),
        )
        .with_plain(
            PlainField::new("title", ScalarType::String).with_description("Title of the article."),
        )
        .with_plain(PlainField::new("body", ScalarType::String))
        .with_plain(PlainField::new("created_at", ScalarType::Datetime))
        .with_plain(PlainField::new("deleted_at", ScalarType::Datetime).with_nullable(true))
        .with_plain_index(PlainIndex::new(["created_at"]))
        .with_gin_index(GinIndex::new("title"));

    let comments = Model::new("bbs_article_comments")
        .with_description("Comment written on an article.")
        .with_foreign(ForeignField::new(
            "bbs_article_id",
            Relation::new("article", "bbs_articles").with_opposite_name("comments"),
        ))
        .with_foreign(
            ForeignField::new(
                "parent_id",
                Relation::new("parent", "bbs_article_comments")
                    .with_mapping_name("recursive")
                    .with_opposite_name("children"),
            )
            .with_description("Parent comment's id.")
            .with_nullable(true),
        )
        .with_plain(PlainField::new("body", ScalarType::String));

    Application::new(vec![
        File::for_component(&components[0]).with_model(users),
        File::for_component(&components[1])
            .with_model(articles)
            .with_model(comments),
    ])
}
