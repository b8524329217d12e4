//! 单例缓存
//!
//! 每个键对应一个异步 `OnceCell`：并发的首次解析只会调用一次提供者，其余调用等待同一结果。
//! 构建失败不会写入缓存，之后的解析会重新调用提供者。
//!
//! 缓存同时记录等待关系：哪次顶层解析正在构建哪个键，以及哪些解析在等待哪个键。
//! 两个任务互相等待对方正在构建的键时，后发起等待的一方得到循环依赖错误，而不是一直挂起。

use dashmap::DashMap;
use di_abstractions::{BindingKey, DependencyError, DependencyResult, Instance};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// 顶层解析的编号
pub(crate) type ResolutionId = u64;

#[derive(Debug, Default)]
pub struct SingletonCache {
    cells: DashMap<BindingKey, Arc<OnceCell<Instance>>>,
    waits: Mutex<WaitGraph>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已构建的实例
    pub fn get(&self, key: &BindingKey) -> Option<Instance> {
        self.cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// 获取实例，尚未构建时调用 `init`
    ///
    /// `chain` 是当前解析链，最后一个元素是 `key`。
    pub(crate) async fn get_or_try_init<F, Fut>(
        &self,
        resolution: ResolutionId,
        chain: &[BindingKey],
        init: F,
    ) -> DependencyResult<Instance>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DependencyResult<Instance>>,
    {
        let Some(&key) = chain.last() else {
            return Err(DependencyError::unresolved("<empty>"));
        };
        let cell = self
            .cells
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(instance) = cell.get() {
            return Ok(instance.clone());
        }

        let waiting = self.begin_wait(resolution, chain)?;
        let instance = cell
            .get_or_try_init(move || {
                drop(waiting);
                let building = self.begin_build(resolution, key);
                async move {
                    let _building = building;
                    init().await
                }
            })
            .await?;
        Ok(instance.clone())
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.get(key).is_some()
    }

    /// 已构建的实例数量
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 登记等待；等待会闭合成环时返回循环依赖错误
    fn begin_wait(
        &self,
        resolution: ResolutionId,
        chain: &[BindingKey],
    ) -> DependencyResult<WaitGuard<'_>> {
        let mut graph = self.waits.lock();
        if let Some(dependency_chain) = graph.find_cycle(resolution, chain) {
            debug!("并发解析互相等待: {}", dependency_chain);
            return Err(DependencyError::CircularDependency { dependency_chain });
        }

        let token = graph.next_token;
        graph.next_token += 1;
        graph.waits.insert(
            token,
            Wait {
                resolution,
                chain: chain.to_vec(),
            },
        );
        Ok(WaitGuard {
            graph: &self.waits,
            token,
        })
    }

    fn begin_build(&self, resolution: ResolutionId, key: BindingKey) -> BuildGuard<'_> {
        self.waits.lock().builders.insert(key, resolution);
        BuildGuard {
            graph: &self.waits,
            resolution,
            key,
        }
    }
}

/// 一次尚未结束的等待
#[derive(Debug)]
struct Wait {
    resolution: ResolutionId,
    /// 等待方的解析链，末尾是被等待的键
    chain: Vec<BindingKey>,
}

#[derive(Debug, Default)]
struct WaitGraph {
    /// 正在构建的键及构建它的解析
    builders: HashMap<BindingKey, ResolutionId>,
    waits: HashMap<u64, Wait>,
    next_token: u64,
}

impl WaitGraph {
    /// `resolution` 等待 `chain` 末尾的键时，沿构建者与等待关系能否回到自身
    fn find_cycle(&self, resolution: ResolutionId, chain: &[BindingKey]) -> Option<String> {
        let key = chain.last()?;
        let builder = *self.builders.get(key)?;
        // 同一次解析的并行分支共享依赖，不算环
        if builder == resolution {
            return None;
        }

        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if !self.reaches(builder, resolution, &mut visited, &mut path) {
            return None;
        }
        Some(describe_cycle(chain, &path))
    }

    fn reaches<'a>(
        &'a self,
        from: ResolutionId,
        target: ResolutionId,
        visited: &mut HashSet<ResolutionId>,
        path: &mut Vec<&'a Wait>,
    ) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from) {
            return false;
        }

        for wait in self.waits.values().filter(|wait| wait.resolution == from) {
            let Some(builder) = wait.chain.last().and_then(|key| self.builders.get(key)) else {
                continue;
            };
            path.push(wait);
            if self.reaches(*builder, target, visited, path) {
                return true;
            }
            path.pop();
        }
        false
    }
}

/// 把当前解析链与途经的等待链拼成 `A -> B -> A` 形式
fn describe_cycle(chain: &[BindingKey], path: &[&Wait]) -> String {
    let closing = path.last().and_then(|wait| wait.chain.last());
    let start = closing
        .and_then(|closing| chain.iter().position(|key| key == closing))
        .unwrap_or(0);

    let mut keys = chain[start..].to_vec();
    for wait in path {
        let from = keys
            .last()
            .and_then(|previous| wait.chain.iter().position(|key| key == previous))
            .map_or(0, |index| index + 1);
        keys.extend_from_slice(&wait.chain[from..]);
    }

    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

struct WaitGuard<'a> {
    graph: &'a Mutex<WaitGraph>,
    token: u64,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.graph.lock().waits.remove(&self.token);
    }
}

struct BuildGuard<'a> {
    graph: &'a Mutex<WaitGraph>,
    resolution: ResolutionId,
    key: BindingKey,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let mut graph = self.graph.lock();
        if graph.builders.get(&self.key) == Some(&self.resolution) {
            graph.builders.remove(&self.key);
        }
    }
}
