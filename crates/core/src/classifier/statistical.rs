//! Statistical content detector.
//!
//! A multinomial naive Bayes classifier over code tokens, trained on a small
//! built-in sample set. Each language gets a token frequency table; a block
//! scores the sum of log token probabilities under each table, with Laplace
//! smoothing, and the best language wins only when it clears the runner-up
//! by [`MIN_MARGIN`] nats.
//!
//! Tokens are identifiers, keywords, and runs of operator characters. String
//! and number literals are dropped.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::detector::ContentDetector;

/// Fewest known tokens a block needs before the model answers.
pub const MIN_KNOWN_TOKENS: usize = 4;
/// Log-probability lead the best language needs over the runner-up.
pub const MIN_MARGIN: f64 = 2.0;
/// Tokens beyond this count are ignored.
pub const MAX_TOKENS: usize = 2000;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)'|[A-Za-z_][A-Za-z0-9_]*|[0-9][0-9A-Za-z_.]*|[!#$%&*+\-./:;<=>?@\\^|~']+|[(){}\[\],]"#,
    )
    .expect("token pattern is valid")
});

static DEFAULT_MODEL: LazyLock<TokenModel> = LazyLock::new(|| TokenModel::train(SAMPLES));

/// Training samples: native language name, code.
pub const SAMPLES: &[(&str, &str)] = &[
    (
        "Go",
        r#"package main

import (
	"fmt"
	"net/http"
)

func handler(w http.ResponseWriter, r *http.Request) {
	fmt.Fprintf(w, "hello %s", r.URL.Path)
}

func main() {
	http.HandleFunc("/", handler)
	if err := http.ListenAndServe(":8080", nil); err != nil {
		panic(err)
	}
}"#,
    ),
    (
        "Go",
        r#"type Store struct {
	mu    sync.Mutex
	items map[string]int
}

func (s *Store) Add(key string, n int) error {
	s.mu.Lock()
	defer s.mu.Unlock()
	if n < 0 {
		return errors.New("negative")
	}
	s.items[key] += n
	return nil
}

func worker(jobs <-chan int, results chan<- int) {
	for j := range jobs {
		results <- j * 2
	}
	go func() { close(results) }()
}"#,
    ),
    (
        "Rust",
        r#"use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    values: Vec<u32>,
}

impl Config {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), values: Vec::new() }
    }
}

fn main() {
    let mut map: HashMap<String, i32> = HashMap::new();
    map.insert("a".to_string(), 1);
    println!("{:?}", map);
}"#,
    ),
    (
        "Rust",
        r#"pub trait Shape {
    fn area(&self) -> f64;
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn parse(input: &str) -> Result<Vec<u8>, Error> {
    let bytes = input.as_bytes();
    match bytes.first() {
        Some(b) if *b == b'#' => Ok(bytes.to_vec()),
        Some(_) => Err(Error::Invalid),
        None => Ok(vec![]),
    }
}

async fn fetch(client: &Client) -> anyhow::Result<()> {
    let body = client.get(URL).send().await?.text().await?;
    Ok(())
}"#,
    ),
    (
        "Java",
        r#"package com.example.app;

import java.util.ArrayList;
import java.util.List;

public class Main {
    private final List<String> names = new ArrayList<>();

    public static void main(String[] args) {
        Main app = new Main();
        app.add("world");
        System.out.println("Hello, " + app.names.get(0));
    }

    public void add(String name) {
        names.add(name);
    }
}"#,
    ),
    (
        "Java",
        r#"@Override
public boolean equals(Object other) {
    if (this == other) return true;
    if (!(other instanceof User)) return false;
    User user = (User) other;
    return id == user.id;
}

public interface Repository<T> {
    Optional<T> findById(long id);
}

try {
    Files.readAllLines(Paths.get("data.txt"));
} catch (IOException e) {
    throw new RuntimeException(e);
}"#,
    ),
    (
        "Python",
        r#"import os
from pathlib import Path


class Loader:
    def __init__(self, root):
        self.root = Path(root)

    def load(self, name):
        with open(self.root / name) as f:
            return f.read()


def main():
    loader = Loader(os.getcwd())
    for line in loader.load("data.txt").splitlines():
        if not line:
            continue
        print(line)


if __name__ == "__main__":
    main()"#,
    ),
    (
        "Python",
        r#"@dataclass
class Point:
    x: float
    y: float

def distance(a, b):
    return ((a.x - b.x) ** 2 + (a.y - b.y) ** 2) ** 0.5

try:
    values = [int(v) for v in items if v is not None]
except ValueError as e:
    raise RuntimeError("bad value") from e
elif_count = len(values)
print(f"{elif_count} values", True, False, None)"#,
    ),
    (
        "JavaScript",
        r#"const express = require('express');
const app = express();

app.get('/', (req, res) => {
  res.send('hello');
});

function sum(values) {
  let total = 0;
  for (const v of values) {
    total += v;
  }
  return total;
}

module.exports = { sum };
console.log(sum([1, 2, 3]));"#,
    ),
    (
        "JavaScript",
        r#"document.addEventListener('DOMContentLoaded', () => {
  const button = document.querySelector('#save');
  button.addEventListener('click', async (event) => {
    event.preventDefault();
    const response = await fetch('/api/items');
    const data = await response.json();
    if (data.items.length === 0) {
      return;
    }
    this.render(data.items);
  });
});

export default function render(items) {
  return items.map((item) => `<li>${item}</li>`).join('');
}"#,
    ),
    (
        "TypeScript",
        r#"interface User {
  id: number;
  name: string;
  email?: string;
}

type Handler = (user: User) => Promise<void>;

export class UserService {
  private readonly users: Map<number, User> = new Map();

  constructor(private readonly http: HttpClient) {}

  async find(id: number): Promise<User | undefined> {
    return this.users.get(id);
  }
}

export const isAdmin = (user: User): boolean => user.name === 'admin';"#,
    ),
    (
        "C",
        r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>

typedef struct node {
    int value;
    struct node *next;
} node_t;

int main(int argc, char **argv) {
    char *buffer = malloc(256);
    if (buffer == NULL) {
        return 1;
    }
    strcpy(buffer, argv[0]);
    printf("%s\n", buffer);
    free(buffer);
    return 0;
}"#,
    ),
    (
        "C++",
        r#"#include <iostream>
#include <vector>
#include <string>

namespace app {

template <typename T>
class Stack {
public:
    void push(const T& value) { items_.push_back(value); }
    T pop() {
        T top = items_.back();
        items_.pop_back();
        return top;
    }
private:
    std::vector<T> items_;
};

}  // namespace app

int main() {
    std::vector<std::string> names{"a", "b"};
    for (const auto& name : names) {
        std::cout << name << std::endl;
    }
    auto ptr = std::make_unique<app::Stack<int>>();
    return 0;
}"#,
    ),
    (
        "C#",
        r#"using System;
using System.Collections.Generic;
using System.Linq;

namespace Example
{
    public class Program
    {
        public static void Main(string[] args)
        {
            var numbers = new List<int> { 1, 2, 3 };
            var evens = numbers.Where(n => n % 2 == 0).ToList();
            Console.WriteLine($"Count: {evens.Count}");
        }

        public string Name { get; set; }

        public async Task<int> LoadAsync()
        {
            await Task.Delay(10);
            return 1;
        }
    }
}"#,
    ),
    (
        "Ruby",
        r#"require 'json'

class Greeter
  attr_reader :name

  def initialize(name)
    @name = name
  end

  def greet
    puts "Hello, #{@name}"
  end
end

items.each do |item|
  next if item.nil?
  puts item.to_s
end

module Helpers
  def self.call(*args)
    args.map { |a| a * 2 }
  end
end"#,
    ),
    (
        "PHP",
        r#"<?php

namespace App\Http;

use App\Models\User;

class UserController extends Controller
{
    public function show($id)
    {
        $user = User::find($id);
        if ($user === null) {
            return response()->json(['error' => 'not found'], 404);
        }
        echo $user->name;
        return $this->view('user', ['user' => $user]);
    }
}

foreach ($items as $key => $value) {
    $total += $value;
}"#,
    ),
    (
        "SQL",
        r#"CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT NOW()
);

INSERT INTO users (name) VALUES ('alice');

SELECT u.name, COUNT(o.id) AS orders
FROM users u
LEFT JOIN orders o ON o.user_id = u.id
WHERE u.created_at > '2024-01-01'
GROUP BY u.name
ORDER BY orders DESC
LIMIT 10;

UPDATE users SET name = 'bob' WHERE id = 1;
DELETE FROM users WHERE id = 2;"#,
    ),
    (
        "Shell",
        r#"#!/bin/bash
set -euo pipefail

for file in *.log; do
  if [ -f "$file" ]; then
    echo "processing $file"
    grep -v DEBUG "$file" > "${file%.log}.txt"
  fi
done

export PATH="$HOME/bin:$PATH"
cd /tmp && tar -xzf archive.tar.gz
sudo apt-get install -y curl
curl -fsSL https://example.com/install.sh | sh
chmod +x ./run.sh && ./run.sh"#,
    ),
    (
        "YAML",
        r#"version: "3.8"
services:
  web:
    image: nginx:latest
    ports:
      - "80:80"
    environment:
      - NODE_ENV=production
    depends_on:
      - db
  db:
    image: postgres:16
    volumes:
      - data:/var/lib/postgresql/data
volumes:
  data: {}"#,
    ),
    (
        "JSON",
        r#"{
  "name": "example",
  "version": "1.0.0",
  "private": true,
  "scripts": {
    "build": "tsc",
    "test": "jest"
  },
  "dependencies": {
    "express": "^4.18.0"
  },
  "files": ["dist", "README.md"],
  "count": 3,
  "enabled": false,
  "parent": null
}"#,
    ),
    (
        "HTML",
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Page</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <div class="container">
    <h1>Welcome</h1>
    <p>Some <a href="/about">text</a>.</p>
    <ul>
      <li>One</li>
    </ul>
    <img src="logo.png" alt="logo">
  </div>
  <script src="app.js"></script>
</body>
</html>"#,
    ),
    (
        "CSS",
        r#"body {
  margin: 0;
  font-family: sans-serif;
  background-color: #fafafa;
}

.container > .item:hover {
  color: #333;
  padding: 4px 8px;
  border-radius: 4px;
}

@media (max-width: 600px) {
  .container {
    display: flex;
    flex-direction: column;
  }
}"#,
    ),
    (
        "Kotlin",
        r#"package com.example

data class User(val id: Long, val name: String)

fun main() {
    val users = listOf(User(1, "a"), User(2, "b"))
    val names = users.filter { it.id > 1 }.map { it.name }
    println(names)
    var count: Int? = null
    when (count) {
        null -> println("none")
        else -> println(count)
    }
}

suspend fun load(): List<User> = withContext(Dispatchers.IO) { emptyList() }"#,
    ),
    (
        "Swift",
        r#"import Foundation

struct Point {
    var x: Double
    var y: Double
}

class ViewModel: ObservableObject {
    @Published var items: [String] = []

    func load() {
        guard let url = URL(string: "https://example.com") else { return }
        let task = URLSession.shared.dataTask(with: url) { data, _, _ in
            if let data = data {
                print(data.count)
            }
        }
        task.resume()
    }
}

let point = Point(x: 1, y: 2)"#,
    ),
    (
        "Lua",
        r#"local M = {}

function M.greet(name)
  if name == nil then
    return "hello"
  end
  return "hello " .. name
end

for i, v in ipairs(items) do
  print(i, v)
end

local t = setmetatable({}, { __index = M })
while not done do
  done = step()
end

return M"#,
    ),
    (
        "Haskell",
        r#"module Main where

import qualified Data.Map as Map

data Shape = Circle Double | Square Double
  deriving (Show, Eq)

area :: Shape -> Double
area (Circle r) = pi * r * r
area (Square s) = s * s

main :: IO ()
main = do
  let shapes = [Circle 1.0, Square 2.0]
  mapM_ (print . area) shapes
  where
    helper x = x + 1"#,
    ),
    (
        "Scala",
        r#"object Main extends App {
  case class User(id: Int, name: String)

  val users = List(User(1, "a"), User(2, "b"))
  users.foreach(u => println(u.name))

  def find(id: Int): Option[User] = users.find(_.id == id)

  find(1) match {
    case Some(user) => println(user)
    case None => println("missing")
  }

  implicit val ordering: Ordering[User] = Ordering.by(_.id)
  trait Greeter { def greet(): Unit }
}"#,
    ),
    (
        "Elixir",
        r#"defmodule Greeter do
  @moduledoc "Greets people."

  def hello(name) when is_binary(name) do
    IO.puts("Hello, #{name}")
  end

  defp helper(list) do
    list
    |> Enum.map(fn x -> x * 2 end)
    |> Enum.filter(&(&1 > 2))
  end
end

case File.read("data.txt") do
  {:ok, body} -> IO.puts(body)
  {:error, reason} -> IO.inspect(reason)
end"#,
    ),
    (
        "Dockerfile",
        r#"FROM node:20-alpine AS build
WORKDIR /app
COPY package*.json ./
RUN npm ci
COPY . .
RUN npm run build

FROM nginx:alpine
COPY --from=build /app/dist /usr/share/nginx/html
EXPOSE 80
ENV NODE_ENV=production
ARG VERSION
LABEL maintainer="team"
ENTRYPOINT ["nginx"]
CMD ["-g", "daemon off;"]"#,
    ),
];

/// Split code into classifier tokens.
pub fn tokenize(content: &str) -> impl Iterator<Item = &str> {
    TOKEN
        .find_iter(content)
        .map(|m| m.as_str())
        .filter(|token| !is_literal(token))
        .take(MAX_TOKENS)
}

fn is_literal(token: &str) -> bool {
    token.starts_with('"')
        || (token.len() >= 3 && token.starts_with('\'') && token.ends_with('\''))
        || token.starts_with(|c: char| c.is_ascii_digit())
}

/// Token frequency tables per language.
#[derive(Debug, Clone)]
pub struct TokenModel {
    languages: Vec<LanguageTokens>,
    vocabulary: usize,
}

#[derive(Debug, Clone)]
struct LanguageTokens {
    name: String,
    counts: HashMap<String, usize>,
    total: usize,
}

impl TokenModel {
    /// Train a model from `(language, sample)` pairs. Samples of the same
    /// language pool into one table.
    pub fn train<S: AsRef<str>>(samples: &[(S, S)]) -> Self {
        let mut languages: Vec<LanguageTokens> = Vec::new();
        let mut vocabulary: HashSet<&str> = HashSet::new();

        for (name, sample) in samples {
            let name = name.as_ref();
            let index = match languages.iter().position(|l| l.name == name) {
                Some(index) => index,
                None => {
                    languages.push(LanguageTokens { name: name.to_string(), counts: HashMap::new(), total: 0 });
                    languages.len() - 1
                }
            };
            let entry = &mut languages[index];
            for token in tokenize(sample.as_ref()) {
                *entry.counts.entry(token.to_string()).or_default() += 1;
                entry.total += 1;
                vocabulary.insert(token);
            }
        }

        Self { languages, vocabulary: vocabulary.len() }
    }

    /// The shared model trained on [`SAMPLES`].
    pub fn default_model() -> &'static TokenModel {
        &DEFAULT_MODEL
    }

    /// Log-likelihood of `content` under each language, in training order.
    ///
    /// Only tokens seen in training count. Returns the scores and the number
    /// of known tokens.
    pub fn scores(&self, content: &str) -> (Vec<(&str, f64)>, usize) {
        let known: Vec<&str> = tokenize(content)
            .filter(|token| self.languages.iter().any(|l| l.counts.contains_key(*token)))
            .collect();

        let scores = self
            .languages
            .iter()
            .map(|language| {
                let denominator = (language.total + self.vocabulary) as f64;
                let score: f64 = known
                    .iter()
                    .map(|token| {
                        let count = language.counts.get(*token).copied().unwrap_or(0);
                        ((count + 1) as f64 / denominator).ln()
                    })
                    .sum();
                (language.name.as_str(), score)
            })
            .collect();

        (scores, known.len())
    }

    /// The most likely language, if the evidence is strong enough.
    pub fn classify(&self, content: &str) -> Option<&str> {
        let (scores, known) = self.scores(content);
        if known < MIN_KNOWN_TOKENS {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        let mut runner_up = f64::NEG_INFINITY;
        for (name, score) in scores {
            match best {
                Some((_, top)) if score > top => {
                    runner_up = top;
                    best = Some((name, score));
                }
                Some(_) => runner_up = runner_up.max(score),
                None => best = Some((name, score)),
            }
        }

        let (name, top) = best?;
        (top - runner_up >= MIN_MARGIN).then_some(name)
    }

    /// Languages known to the model, in training order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|l| l.name.as_str())
    }
}

/// Content detector backed by the built-in token model.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalDetector;

impl StatisticalDetector {
    pub fn new() -> Self {
        Self
    }
}

impl ContentDetector for StatisticalDetector {
    fn name(&self) -> &str {
        "statistical"
    }

    fn detect(&self, content: &str) -> Option<String> {
        TokenModel::default_model().classify(content).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::detector::map_detector_name;
    use rstest::rstest;

    fn detect(content: &str) -> Option<&'static str> {
        StatisticalDetector::new().detect(content).as_deref().and_then(map_detector_name)
    }

    #[test]
    fn test_tokenize_drops_literals() {
        let tokens: Vec<&str> = tokenize(r#"let x = "a b" + 42; y := x.len()"#).collect();
        assert_eq!(tokens, vec!["let", "x", "=", "+", ";", "y", ":=", "x", ".", "len", "(", ")"]);
    }

    #[test]
    fn test_every_sample_language_is_mapped() {
        for language in TokenModel::default_model().languages() {
            assert!(map_detector_name(language).is_some(), "{language}");
        }
    }

    #[rstest]
    #[case::java(
        "public class Greeter {\n    public static void main(String[] args) {\n        System.out.println(\"hi\");\n    }\n}",
        "java"
    )]
    #[case::go("func add(a int, b int) int {\n\treturn a + b\n}\n\nfunc main() {\n\tfmt.Println(add(1, 2))\n}", "go")]
    #[case::rust(
        "pub fn add(a: u32, b: u32) -> u32 {\n    a + b\n}\n\nimpl Point {\n    pub fn new() -> Self { Self { x: 0 } }\n}",
        "rust"
    )]
    #[case::sql("SELECT name, email\nFROM users\nWHERE id = 1\nORDER BY name;", "sql")]
    #[case::ruby("class Cart\n  def initialize\n    @items = []\n  end\n\n  def add(item)\n    @items << item\n  end\nend", "ruby")]
    #[case::csharp(
        "namespace Shop\n{\n    public class Order\n    {\n        public int Id { get; set; }\n        public string Name { get; set; }\n    }\n}",
        "csharp"
    )]
    #[case::python("def greet(name):\n    return f\"hi {name}\"\n\nfor n in names:\n    print(greet(n))", "python")]
    #[case::javascript(
        "const total = items.reduce((sum, item) => sum + item.price, 0);\nconsole.log(total);",
        "javascript"
    )]
    fn test_detects_typical_blocks(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(detect(content), Some(expected));
    }

    #[test]
    fn test_prose_is_not_classified() {
        assert_eq!(detect("The quick brown fox jumps over the lazy dog."), None);
        assert_eq!(detect(""), None);
        assert_eq!(detect("x"), None);
    }

    #[test]
    fn test_custom_model() {
        let model = TokenModel::train(&[("Alpha", "aa bb aa bb cc"), ("Beta", "xx yy xx yy zz")]);
        assert_eq!(model.classify("aa bb aa bb"), Some("Alpha"));
        assert_eq!(model.classify("xx yy zz xx"), Some("Beta"));
        assert_eq!(model.classify("aa xx"), None);
    }
}
