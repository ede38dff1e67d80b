use anyhow::{Context, Result};
use chrono::SecondsFormat;
use sea_orm::sea_query::{
    Alias, Expr, Order, OrderedStatement, Query, SelectStatement, WindowStatement,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use super::relation::{RelationTable, targets_among};
use crate::domain::{AccountId, RecipeId, TagId};
use crate::entities::{
    accounts, cart_items, favorites, ingredients, prelude::*, recipe_ingredients, recipe_tags,
    recipes, subscriptions, tags,
};
use crate::models::account::{Account, AuthorProfile};
use crate::models::catalog::Tag;
use crate::models::page::PageRequest;
use crate::models::recipe::{
    IngredientLine, NewRecipe, RecipeDetail, RecipeFilter, RecipeIngredient, RecipeIngredientRow,
    RecipeSummary, RecipeUpdate,
};

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Write a recipe with its ingredient lines and tags in one transaction.
    pub async fn create(&self, recipe: NewRecipe) -> Result<RecipeId> {
        let txn = self.conn.begin().await?;

        let model = recipes::ActiveModel {
            name: Set(recipe.name),
            author_id: Set(recipe.author_id.value()),
            text: Set(recipe.text),
            cooking_time: Set(recipe.cooking_time),
            image: Set(recipe.image),
            pub_date: Set(publication_timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert recipe")?;

        insert_lines(&txn, model.id, &recipe.lines).await?;
        insert_tags(&txn, model.id, &recipe.tag_ids).await?;

        txn.commit().await?;
        Ok(RecipeId::new(model.id))
    }

    /// Merge the supplied fields over the stored recipe. Ingredient lines and
    /// tags are replaced wholesale when supplied. Returns `false` if the recipe
    /// does not exist.
    pub async fn update(&self, id: RecipeId, update: RecipeUpdate) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(model) = Recipes::find_by_id(id.value()).one(&txn).await? else {
            return Ok(false);
        };

        let mut active: recipes::ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(text) = update.text {
            active.text = Set(text);
        }
        if let Some(cooking_time) = update.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        if let Some(image) = update.image {
            active.image = Set(image);
        }
        if active.is_changed() {
            active.update(&txn).await.context("Failed to update recipe")?;
        }

        if let Some(lines) = update.lines {
            RecipeIngredients::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(id.value()))
                .exec(&txn)
                .await?;
            insert_lines(&txn, id.value(), &lines).await?;
        }

        if let Some(tag_ids) = update.tag_ids {
            RecipeTags::delete_many()
                .filter(recipe_tags::Column::RecipeId.eq(id.value()))
                .exec(&txn)
                .await?;
            insert_tags(&txn, id.value(), &tag_ids).await?;
        }

        txn.commit().await?;
        Ok(true)
    }

    /// Delete a recipe; lines, tag links, favorites and cart rows cascade.
    pub async fn delete(&self, id: RecipeId) -> Result<bool> {
        let result = Recipes::delete_by_id(id.value())
            .exec(&self.conn)
            .await
            .context("Failed to delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_model(&self, id: RecipeId) -> Result<Option<recipes::Model>> {
        let recipe = Recipes::find_by_id(id.value()).one(&self.conn).await?;
        Ok(recipe)
    }

    /// One page of the catalog, newest first.
    ///
    /// The favorite and cart filters only apply when a viewer is given.
    pub async fn list_page(
        &self,
        filter: &RecipeFilter,
        viewer: Option<AccountId>,
        page: PageRequest,
    ) -> Result<(Vec<recipes::Model>, u64)> {
        let mut query = Recipes::find();

        if let Some(author) = filter.author {
            query = query.filter(recipes::Column::AuthorId.eq(author.value()));
        }

        if let Some(viewer) = viewer {
            if filter.is_favorited {
                query = query.filter(
                    recipes::Column::Id.in_subquery(favorites::Entity::targets_of(viewer.value())),
                );
            }
            if filter.is_in_shopping_cart {
                query = query.filter(
                    recipes::Column::Id
                        .in_subquery(cart_items::Entity::targets_of(viewer.value())),
                );
            }
        }

        if !filter.tags.is_empty() {
            let tagged = Query::select()
                .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                .from(recipe_tags::Entity)
                .inner_join(
                    tags::Entity,
                    Expr::col((tags::Entity, tags::Column::Id))
                        .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                )
                .and_where(Expr::col((tags::Entity, tags::Column::Slug)).is_in(filter.tags.clone()))
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(tagged));
        }

        let paginator = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .paginate(&self.conn, page.limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok((items, total))
    }

    /// Expand recipe rows into full read models. Authors, tags, ingredient lines
    /// and each viewer flag are fetched with one query apiece for the whole batch.
    pub async fn load_details(
        &self,
        models: Vec<recipes::Model>,
        viewer: Option<AccountId>,
    ) -> Result<Vec<RecipeDetail>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let author_ids: Vec<i32> = models
            .iter()
            .map(|m| m.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<i32, Account> = Accounts::find()
            .filter(accounts::Column::Id.is_in(author_ids.clone()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|a| (a.id, Account::from(a)))
            .collect();

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        let tag_rows = RecipeTags::find()
            .find_also_related(Tags)
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.clone()))
            .order_by_asc(tags::Column::Id)
            .all(&self.conn)
            .await?;
        for (link, tag) in tag_rows {
            if let Some(tag) = tag {
                tags_by_recipe
                    .entry(link.recipe_id)
                    .or_default()
                    .push(Tag::from(tag));
            }
        }

        let mut lines_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        let line_rows = RecipeIngredients::find()
            .select_only()
            .column(recipe_ingredients::Column::RecipeId)
            .column_as(ingredients::Column::Id, "id")
            .column_as(ingredients::Column::Name, "name")
            .column_as(ingredients::Column::MeasurementUnit, "measurement_unit")
            .column(recipe_ingredients::Column::Amount)
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Ingredient.def(),
            )
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.clone()))
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .into_model::<RecipeIngredientRow>()
            .all(&self.conn)
            .await?;
        for row in line_rows {
            lines_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredient::from(row));
        }

        let (favorited, in_cart, subscribed) = match viewer {
            Some(viewer) => {
                let viewer = viewer.value();
                (
                    targets_among::<favorites::Entity, _>(&self.conn, viewer, &recipe_ids).await?,
                    targets_among::<cart_items::Entity, _>(&self.conn, viewer, &recipe_ids)
                        .await?,
                    targets_among::<subscriptions::Entity, _>(&self.conn, viewer, &author_ids)
                        .await?,
                )
            }
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        models
            .into_iter()
            .map(|model| -> Result<RecipeDetail> {
                let author = authors
                    .get(&model.author_id)
                    .cloned()
                    .with_context(|| format!("Author of recipe {} not found", model.id))?;

                Ok(RecipeDetail {
                    id: RecipeId::new(model.id),
                    author: AuthorProfile::new(author, subscribed.contains(&model.author_id)),
                    tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                    ingredients: lines_by_recipe.remove(&model.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&model.id),
                    is_in_shopping_cart: in_cart.contains(&model.id),
                    name: model.name,
                    text: model.text,
                    cooking_time: model.cooking_time,
                    image: model.image,
                    pub_date: model.pub_date,
                })
            })
            .collect()
    }

    /// Newest recipes per author (at most `per_author` each, all when `None`)
    /// together with each author's total recipe count.
    pub async fn summaries_by_authors(
        &self,
        author_ids: &[AccountId],
        per_author: Option<u64>,
    ) -> Result<HashMap<AccountId, (Vec<RecipeSummary>, u64)>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = author_ids.iter().map(|id| id.value()).collect();

        let counts: Vec<(i32, i64)> = Recipes::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(recipes::Column::Id.count(), "count")
            .filter(recipes::Column::AuthorId.is_in(ids.clone()))
            .group_by(recipes::Column::AuthorId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        let mut result: HashMap<AccountId, (Vec<RecipeSummary>, u64)> = author_ids
            .iter()
            .map(|id| (*id, (Vec::new(), 0)))
            .collect();

        for (author_id, count) in counts {
            if let Some(entry) = result.get_mut(&AccountId::new(author_id)) {
                entry.1 = u64::try_from(count).unwrap_or_default();
            }
        }

        if per_author == Some(0) {
            return Ok(result);
        }

        let mut query = Recipes::find().filter(recipes::Column::AuthorId.is_in(ids.clone()));
        if let Some(limit) = per_author {
            query = query.filter(recipes::Column::Id.in_subquery(newest_per_author(ids, limit)));
        }

        let rows = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?;

        for row in rows {
            if let Some((summaries, _)) = result.get_mut(&AccountId::new(row.author_id)) {
                summaries.push(RecipeSummary::from(row));
            }
        }

        Ok(result)
    }
}

/// `SELECT id` of each author's `limit` newest recipes, ranked with `ROW_NUMBER()`.
fn newest_per_author(author_ids: Vec<i32>, limit: u64) -> SelectStatement {
    let mut window = WindowStatement::partition_by(recipes::Column::AuthorId);
    window
        .order_by(recipes::Column::PubDate, Order::Desc)
        .order_by(recipes::Column::Id, Order::Desc);

    let ranked = Query::select()
        .column(recipes::Column::Id)
        .expr_window_as(Expr::cust("ROW_NUMBER()"), window, Alias::new("rank"))
        .from(recipes::Entity)
        .and_where(recipes::Column::AuthorId.is_in(author_ids))
        .to_owned();

    Query::select()
        .column(Alias::new("id"))
        .from_subquery(ranked, Alias::new("ranked"))
        .and_where(Expr::col(Alias::new("rank")).lte(i64::try_from(limit).unwrap_or(i64::MAX)))
        .to_owned()
}

/// Fixed microsecond precision keeps lexical order equal to publication order.
fn publication_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    lines: &[IngredientLine],
) -> Result<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let models: Vec<recipe_ingredients::ActiveModel> = lines
        .iter()
        .map(|line| recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(line.ingredient_id.value()),
            amount: Set(line.amount),
        })
        .collect();

    RecipeIngredients::insert_many(models)
        .exec_without_returning(conn)
        .await
        .context("Failed to insert ingredient lines")?;

    Ok(())
}

async fn insert_tags<C: ConnectionTrait>(conn: &C, recipe_id: i32, tag_ids: &[TagId]) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let models: Vec<recipe_tags::ActiveModel> = tag_ids
        .iter()
        .map(|tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id.value()),
        })
        .collect();

    RecipeTags::insert_many(models)
        .exec_without_returning(conn)
        .await
        .context("Failed to insert recipe tags")?;

    Ok(())
}
